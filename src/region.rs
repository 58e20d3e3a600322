use std::ops::{Index, Range};

/// Represents an area within source text.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct Region {
    /// The beginning of the range, inclusive.
    pub begin: usize,
    /// The ending of the range, exclusive.
    pub end: usize,
}

impl Region {
    /// Create a new Region from the given range.
    pub fn new(position: Range<usize>) -> Self {
        Self {
            begin: position.start,
            end: position.end,
        }
    }

    /// Return a new [`Region`] for the given range, where the range is
    /// relative to the beginning of this `Region`.
    pub fn slice(&self, relative: Range<usize>) -> Self {
        debug_assert!(self.begin + relative.end <= self.end);

        Self {
            begin: self.begin + relative.start,
            end: self.begin + relative.end,
        }
    }

    /// Access the literal value of a [`Region`].
    ///
    /// # Panics
    ///
    /// Panics if the `Region` is out of bounds in the given source text.
    pub fn literal<'source>(&self, source: &'source str) -> &'source str {
        &source[*self]
    }
}

impl Index<Region> for str {
    type Output = str;

    fn index(&self, region: Region) -> &Self::Output {
        let Region { begin, end } = region;

        &self[begin..end]
    }
}

impl From<Range<usize>> for Region {
    fn from(value: Range<usize>) -> Self {
        Self::new(value)
    }
}
