//! Byte-range helpers for scanning sorted storage keys.

use std::ops::{Bound, RangeBounds};

use bytes::Bytes;

/// A range over storage keys with owned bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesRange {
    start: Bound<Bytes>,
    end: Bound<Bytes>,
}

impl BytesRange {
    pub fn new(start: Bound<Bytes>, end: Bound<Bytes>) -> Self {
        Self { start, end }
    }

    /// A range that covers every key.
    pub fn unbounded() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }

    /// Returns true if no key can fall inside the range.
    pub fn is_empty(&self) -> bool {
        match (&self.start, &self.end) {
            (Bound::Included(start), Bound::Included(end)) => start > end,
            (Bound::Included(start), Bound::Excluded(end))
            | (Bound::Excluded(start), Bound::Included(end))
            | (Bound::Excluded(start), Bound::Excluded(end)) => start >= end,
            _ => false,
        }
    }
}

impl RangeBounds<Bytes> for BytesRange {
    fn start_bound(&self) -> Bound<&Bytes> {
        self.start.as_ref()
    }

    fn end_bound(&self) -> Bound<&Bytes> {
        self.end.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_respect_inclusive_and_exclusive_bounds() {
        // given
        let range = BytesRange::new(
            Bound::Included(Bytes::from("b")),
            Bound::Excluded(Bytes::from("d")),
        );

        // then
        assert!(!range.contains(&Bytes::from("a")));
        assert!(range.contains(&Bytes::from("b")));
        assert!(range.contains(&Bytes::from("c")));
        assert!(!range.contains(&Bytes::from("d")));
    }

    #[test]
    fn should_detect_empty_ranges() {
        // given
        let inverted = BytesRange::new(
            Bound::Included(Bytes::from("d")),
            Bound::Included(Bytes::from("b")),
        );
        let degenerate = BytesRange::new(
            Bound::Included(Bytes::from("b")),
            Bound::Excluded(Bytes::from("b")),
        );
        let single = BytesRange::new(
            Bound::Included(Bytes::from("b")),
            Bound::Included(Bytes::from("b")),
        );

        // then
        assert!(inverted.is_empty());
        assert!(degenerate.is_empty());
        assert!(!single.is_empty());
        assert!(!BytesRange::unbounded().is_empty());
    }

    #[test]
    fn should_contain_everything_when_unbounded() {
        // given
        let range = BytesRange::unbounded();

        // then
        assert!(range.contains(&Bytes::new()));
        assert!(range.contains(&Bytes::from_static(&[0xFF; 16])));
    }
}
