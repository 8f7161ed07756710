//! Storage key layout for cells.
//!
//! ```text
//! | version (u8) | row | family | qualifier | visibility | timestamp (u64 BE) |
//! ```
//!
//! Each byte-string component uses [`terminated_bytes`] so the encoded key
//! sorts by `(row, family, qualifier, visibility)`. The timestamp is stored
//! inverted, placing the newest version of a column first.

use std::ops::{Bound, RangeBounds};

use bytes::{BufMut, Bytes, BytesMut};

use crate::BytesRange;
use crate::serde::{DeserializeError, terminated_bytes};

/// Key format version (currently 0x01)
pub const KEY_VERSION: u8 = 0x01;

const SIGN_BIT: u64 = 1 << 63;

/// The full address of one cell version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellKey {
    pub row: Bytes,
    pub family: Bytes,
    pub qualifier: Bytes,
    pub visibility: Bytes,
    pub timestamp: i64,
}

impl CellKey {
    /// Serializes the key to bytes for storage.
    pub fn serialize(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(
            1 + self.row.len()
                + self.family.len()
                + self.qualifier.len()
                + self.visibility.len()
                + 4
                + 8,
        );
        buf.put_u8(KEY_VERSION);
        terminated_bytes::serialize(&self.row, &mut buf);
        terminated_bytes::serialize(&self.family, &mut buf);
        terminated_bytes::serialize(&self.qualifier, &mut buf);
        terminated_bytes::serialize(&self.visibility, &mut buf);
        buf.put_u64(invert_timestamp(self.timestamp));
        buf.freeze()
    }

    /// Deserializes a cell key from bytes.
    pub fn deserialize(data: &[u8]) -> Result<Self, DeserializeError> {
        let Some((&version, mut buf)) = data.split_first() else {
            return Err(DeserializeError {
                message: "buffer too short for cell key".to_string(),
            });
        };
        if version != KEY_VERSION {
            return Err(DeserializeError {
                message: format!(
                    "invalid key version: expected 0x{:02x}, got 0x{:02x}",
                    KEY_VERSION, version
                ),
            });
        }

        let row = terminated_bytes::deserialize(&mut buf)?;
        let family = terminated_bytes::deserialize(&mut buf)?;
        let qualifier = terminated_bytes::deserialize(&mut buf)?;
        let visibility = terminated_bytes::deserialize(&mut buf)?;

        let raw: [u8; 8] = buf.try_into().map_err(|_| DeserializeError {
            message: format!("expected 8 timestamp bytes, got {}", buf.len()),
        })?;

        Ok(CellKey {
            row,
            family,
            qualifier,
            visibility,
            timestamp: restore_timestamp(u64::from_be_bytes(raw)),
        })
    }

    /// Creates a storage key range covering every cell of `row`.
    pub fn row_range(row: &[u8]) -> BytesRange {
        BytesRange::new(
            Bound::Included(row_start(row)),
            Bound::Excluded(row_end(row)),
        )
    }

    /// Translates a range over row identifiers into the storage key range
    /// covering every cell of every row in it.
    ///
    /// An included end bound covers all cells of the end row; an excluded
    /// start bound skips all cells of the start row.
    pub fn rows_range(rows: &BytesRange) -> BytesRange {
        let start = match rows.start_bound() {
            Bound::Included(row) => Bound::Included(row_start(row)),
            Bound::Excluded(row) => Bound::Included(row_end(row)),
            Bound::Unbounded => Bound::Unbounded,
        };
        let end = match rows.end_bound() {
            Bound::Included(row) => Bound::Excluded(row_end(row)),
            Bound::Excluded(row) => Bound::Excluded(row_start(row)),
            Bound::Unbounded => Bound::Unbounded,
        };
        BytesRange::new(start, end)
    }
}

/// Smallest storage key of any cell of `row`.
fn row_start(row: &[u8]) -> Bytes {
    let mut start = BytesMut::new();
    start.put_u8(KEY_VERSION);
    terminated_bytes::serialize(row, &mut start);
    start.freeze()
}

/// First storage key past every cell of `row`.
fn row_end(row: &[u8]) -> Bytes {
    let mut end = BytesMut::new();
    end.put_u8(KEY_VERSION);
    terminated_bytes::serialize(row, &mut end);
    // Swap the trailing terminator for the next byte up to bound the row.
    if let Some(last) = end.last_mut() {
        *last = 0x01;
    }
    end.freeze()
}

/// Maps a timestamp onto a u64 whose byte order is the reverse of the
/// timestamp order.
fn invert_timestamp(timestamp: i64) -> u64 {
    !((timestamp as u64) ^ SIGN_BIT)
}

fn restore_timestamp(raw: u64) -> i64 {
    ((!raw) ^ SIGN_BIT) as i64
}

#[cfg(test)]
mod tests {
    use std::ops::RangeBounds;

    use super::*;

    fn key(row: &str, family: &str, qualifier: &str, timestamp: i64) -> CellKey {
        CellKey {
            row: Bytes::from(row.to_string()),
            family: Bytes::from(family.to_string()),
            qualifier: Bytes::from(qualifier.to_string()),
            visibility: Bytes::new(),
            timestamp,
        }
    }

    #[test]
    fn should_serialize_and_deserialize_cell_key() {
        // given
        let key = CellKey {
            row: Bytes::from("row1"),
            family: Bytes::from("cf"),
            qualifier: Bytes::from("cq"),
            visibility: Bytes::from("PRIVATE"),
            timestamp: 1024,
        };

        // when
        let decoded = CellKey::deserialize(&key.serialize()).unwrap();

        // then
        assert_eq!(decoded, key);
    }

    #[test]
    fn should_order_newer_versions_first() {
        // given
        let older = key("row", "cf", "cq", 10);
        let newer = key("row", "cf", "cq", 20);

        // then
        assert!(newer.serialize() < older.serialize());
    }

    #[test]
    fn should_order_by_family_before_qualifier() {
        // given
        let a = key("row", "a", "z", 0);
        let b = key("row", "a0", "a", 0);

        // then
        assert!(a.serialize() < b.serialize());
    }

    #[test]
    fn should_bound_row_range_to_single_row() {
        // given
        let range = CellKey::row_range(b"row");

        // then
        assert!(range.contains(&key("row", "", "", i64::MAX).serialize()));
        assert!(range.contains(&key("row", "\u{ff}", "\u{ff}", i64::MIN).serialize()));
        assert!(!range.contains(&key("row0", "", "", 0).serialize()));
        assert!(!range.contains(&key("ro", "w", "", 0).serialize()));
    }

    #[test]
    fn should_cover_rows_between_included_bounds() {
        // given
        let range = CellKey::rows_range(&BytesRange::new(
            Bound::Included(Bytes::from("b")),
            Bound::Included(Bytes::from("d")),
        ));

        // then
        assert!(!range.contains(&key("a", "\u{ff}", "\u{ff}", i64::MIN).serialize()));
        assert!(range.contains(&key("b", "", "", i64::MAX).serialize()));
        assert!(range.contains(&key("c", "cf", "cq", 0).serialize()));
        assert!(range.contains(&key("d", "\u{ff}", "\u{ff}", i64::MIN).serialize()));
        assert!(!range.contains(&key("d0", "", "", i64::MAX).serialize()));
        assert!(!range.contains(&key("e", "", "", i64::MAX).serialize()));
    }

    #[test]
    fn should_skip_rows_at_excluded_bounds() {
        // given
        let range = CellKey::rows_range(&BytesRange::new(
            Bound::Excluded(Bytes::from("b")),
            Bound::Excluded(Bytes::from("d")),
        ));

        // then
        assert!(!range.contains(&key("b", "\u{ff}", "\u{ff}", i64::MIN).serialize()));
        assert!(range.contains(&key("b0", "", "", i64::MAX).serialize()));
        assert!(range.contains(&key("c", "cf", "cq", 0).serialize()));
        assert!(!range.contains(&key("d", "", "", i64::MAX).serialize()));
    }

    #[test]
    fn should_translate_unbounded_rows_to_unbounded_keys() {
        // when
        let range = CellKey::rows_range(&BytesRange::unbounded());

        // then
        assert_eq!(range, BytesRange::unbounded());
    }

    #[test]
    fn should_fail_deserialize_with_wrong_version() {
        // given
        let mut data = key("row", "cf", "cq", 0).serialize().to_vec();
        data[0] = 0x02;

        // when
        let result = CellKey::deserialize(&data);

        // then
        assert!(result.is_err());
    }

    #[test]
    fn should_fail_deserialize_with_truncated_timestamp() {
        // given
        let data = key("row", "cf", "cq", 0).serialize();

        // when
        let result = CellKey::deserialize(&data[..data.len() - 1]);

        // then
        assert!(result.is_err());
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn should_invert_timestamp_ordering(a: i64, b: i64) {
                prop_assert_eq!(a.cmp(&b).reverse(), invert_timestamp(a).cmp(&invert_timestamp(b)));
                prop_assert_eq!(restore_timestamp(invert_timestamp(a)), a);
            }

            #[test]
            fn should_preserve_column_ordering(
                a in proptest::collection::vec(any::<u8>(), 0..8),
                b in proptest::collection::vec(any::<u8>(), 0..8),
                qa in proptest::collection::vec(any::<u8>(), 0..8),
                qb in proptest::collection::vec(any::<u8>(), 0..8),
            ) {
                let key_a = CellKey {
                    row: Bytes::from_static(b"row"),
                    family: Bytes::from(a.clone()),
                    qualifier: Bytes::from(qa.clone()),
                    visibility: Bytes::new(),
                    timestamp: 0,
                };
                let key_b = CellKey {
                    row: Bytes::from_static(b"row"),
                    family: Bytes::from(b.clone()),
                    qualifier: Bytes::from(qb.clone()),
                    visibility: Bytes::new(),
                    timestamp: 0,
                };

                prop_assert_eq!((a, qa).cmp(&(b, qb)), key_a.serialize().cmp(&key_b.serialize()));
            }
        }
    }
}
