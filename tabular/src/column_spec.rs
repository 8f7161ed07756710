//! Positional column destinations for record fields.
//!
//! A column-spec string is a comma-separated list of definitions, each either
//! `family` or `family:qualifier_prefix`:
//!
//! ```text
//! spec := def (',' def)*
//! def  := family | family ':' qualifier_prefix
//! ```
//!
//! Definition `i` is the destination of record field `i + 1` (field 0 is the
//! row). Only the first colon splits a definition, so `cf:a:b` has qualifier
//! prefix `a:b`. Commas and colons cannot be escaped.

use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DEFINITION_SEPARATOR: char = ',';
const QUALIFIER_SEPARATOR: char = ':';

/// The destination column for one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub family: String,
    pub qualifier_prefix: Option<String>,
}

impl ColumnSpec {
    pub fn new(family: impl Into<String>, qualifier_prefix: Option<String>) -> Self {
        Self {
            family: family.into(),
            qualifier_prefix,
        }
    }

    /// Parses a single `family[:qualifier_prefix]` definition.
    pub fn parse(definition: &str) -> Result<Self> {
        let (family, qualifier_prefix) = match definition.split_once(QUALIFIER_SEPARATOR) {
            Some((family, prefix)) => (family, Some(prefix.to_string())),
            None => (definition, None),
        };
        if family.is_empty() {
            return Err(Error::Config(format!(
                "column definition '{}' has an empty column family",
                definition
            )));
        }
        Ok(Self::new(family, qualifier_prefix))
    }

    pub fn family_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.family.as_bytes())
    }

    /// Column qualifier for a scalar field: the qualifier prefix, or empty.
    pub fn scalar_qualifier(&self) -> Bytes {
        self.qualifier_prefix
            .as_deref()
            .map(|prefix| Bytes::copy_from_slice(prefix.as_bytes()))
            .unwrap_or_default()
    }

    /// Column qualifier for one entry of a map field: the qualifier prefix
    /// followed by the map key.
    pub fn map_qualifier(&self, key: &str) -> Bytes {
        let prefix = self.qualifier_prefix.as_deref().unwrap_or_default();
        let mut qualifier = BytesMut::with_capacity(prefix.len() + key.len());
        qualifier.put_slice(prefix.as_bytes());
        qualifier.put_slice(key.as_bytes());
        qualifier.freeze()
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier_prefix {
            Some(prefix) => write!(f, "{}{}{}", self.family, QUALIFIER_SEPARATOR, prefix),
            None => write!(f, "{}", self.family),
        }
    }
}

/// An ordered list of column destinations aligned to record fields 1..N.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnSpecs(Vec<ColumnSpec>);

impl ColumnSpecs {
    pub fn new(specs: Vec<ColumnSpec>) -> Self {
        Self(specs)
    }

    /// Parses a comma-separated column-spec string. An empty string yields no
    /// specs.
    pub fn parse(spec: &str) -> Result<Self> {
        if spec.is_empty() {
            return Ok(Self::default());
        }
        spec.split(DEFINITION_SEPARATOR)
            .map(ColumnSpec::parse)
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// The destination of record field `position`, if one was declared.
    ///
    /// Position 0 is the row and never has a destination.
    pub fn for_field(&self, position: usize) -> Option<&ColumnSpec> {
        position
            .checked_sub(1)
            .and_then(|index| self.0.get(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnSpec> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for ColumnSpecs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ColumnSpecs {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ColumnSpecs> for String {
    fn from(specs: ColumnSpecs) -> Self {
        specs.to_string()
    }
}

impl fmt::Display for ColumnSpecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", DEFINITION_SEPARATOR)?;
            }
            write!(f, "{}", spec)?;
        }
        Ok(())
    }
}
