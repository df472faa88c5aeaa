//! Byte classes: the partitioned transition alphabet
//!
//! Transitions are labeled with sets of bytes rather than single symbols, so
//! automata stay small even for `.` and negated classes. A class is a sorted
//! list of disjoint inclusive ranges.

/// A set of bytes stored as sorted, disjoint, inclusive ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteClass {
    ranges: Vec<(u8, u8)>,
}

impl ByteClass {
    /// The empty set.
    pub fn empty() -> Self {
        ByteClass { ranges: Vec::new() }
    }

    /// Every byte.
    pub fn full() -> Self {
        Self::range(0, 255)
    }

    /// A single byte.
    pub fn single(byte: u8) -> Self {
        Self::range(byte, byte)
    }

    /// One inclusive range.
    pub fn range(lo: u8, hi: u8) -> Self {
        debug_assert!(lo <= hi);
        ByteClass { ranges: vec![(lo, hi)] }
    }

    /// Normalize arbitrary ranges: drop inverted ones, sort, merge overlaps
    /// and adjacency.
    pub fn from_ranges(mut ranges: Vec<(u8, u8)>) -> Self {
        ranges.retain(|r| r.0 <= r.1);
        ranges.sort_unstable();
        let mut merged: Vec<(u8, u8)> = Vec::with_capacity(ranges.len());
        for (lo, hi) in ranges {
            match merged.last_mut() {
                Some(last) if u16::from(lo) <= u16::from(last.1) + 1 => {
                    if hi > last.1 {
                        last.1 = hi;
                    }
                }
                _ => merged.push((lo, hi)),
            }
        }
        ByteClass { ranges: merged }
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, byte: u8) -> bool {
        self.ranges.iter().any(|&(lo, hi)| lo <= byte && byte <= hi)
    }

    pub fn ranges(&self) -> &[(u8, u8)] {
        &self.ranges
    }

    pub fn union(&self, other: &Self) -> Self {
        let mut ranges = self.ranges.clone();
        ranges.extend_from_slice(&other.ranges);
        Self::from_ranges(ranges)
    }

    /// Set intersection by merging the two sorted range lists.
    pub fn intersect(&self, other: &Self) -> Self {
        let (mut i, mut j) = (0, 0);
        let mut out = Vec::new();
        while i < self.ranges.len() && j < other.ranges.len() {
            let (alo, ahi) = self.ranges[i];
            let (blo, bhi) = other.ranges[j];
            let lo = alo.max(blo);
            let hi = ahi.min(bhi);
            if lo <= hi {
                out.push((lo, hi));
            }
            if ahi < bhi {
                i += 1;
            } else {
                j += 1;
            }
        }
        Self::from_ranges(out)
    }

    /// Complement over the full byte alphabet.
    pub fn negate(&self) -> Self {
        let mut out = Vec::new();
        let mut next: u16 = 0;
        for &(lo, hi) in &self.ranges {
            if u16::from(lo) > next {
                out.push((next as u8, lo - 1));
            }
            next = u16::from(hi) + 1;
        }
        if next <= 255 {
            out.push((next as u8, 255));
        }
        ByteClass { ranges: out }
    }

    /// A representative member, preferring printable ASCII so witnesses stay
    /// readable.
    pub fn representative(&self) -> Option<u8> {
        for &(lo, hi) in &self.ranges {
            let candidate = lo.max(0x20);
            if candidate <= hi && candidate <= 0x7e {
                return Some(candidate);
            }
        }
        self.ranges.first().map(|r| r.0)
    }

    // Predefined classes for escape sequences.

    pub fn digits() -> Self {
        Self::range(b'0', b'9')
    }

    pub fn word() -> Self {
        Self::from_ranges(vec![(b'0', b'9'), (b'A', b'Z'), (b'a', b'z'), (b'_', b'_')])
    }

    /// `[ \t\n\x0b\x0c\r]`; the control portion is the contiguous run
    /// 0x09..=0x0d.
    pub fn whitespace() -> Self {
        Self::from_ranges(vec![(0x09, 0x0d), (b' ', b' ')])
    }

    /// `.`: any byte except newline.
    pub fn dot() -> Self {
        Self::single(b'\n').negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_ranges_merges() {
        let cls = ByteClass::from_ranges(vec![(b'c', b'f'), (b'a', b'd'), (b'g', b'h')]);
        assert_eq!(cls.ranges(), &[(b'a', b'h')]);
    }

    #[test]
    fn test_negate_round_trip() {
        let cls = ByteClass::from_ranges(vec![(b'a', b'z'), (b'0', b'9')]);
        assert_eq!(cls.negate().negate(), cls);
        assert!(ByteClass::full().negate().is_empty());
        assert_eq!(ByteClass::empty().negate(), ByteClass::full());
    }

    #[test]
    fn test_intersect() {
        let a = ByteClass::range(b'a', b'm');
        let b = ByteClass::range(b'h', b'z');
        assert_eq!(a.intersect(&b).ranges(), &[(b'h', b'm')]);

        let disjoint = ByteClass::range(b'0', b'9');
        assert!(a.intersect(&disjoint).is_empty());
    }

    #[test]
    fn test_representative_prefers_printable() {
        assert_eq!(ByteClass::full().representative(), Some(b' '));
        assert_eq!(ByteClass::single(b'\n').representative(), Some(b'\n'));
        assert_eq!(ByteClass::dot().representative(), Some(b' '));
        assert_eq!(ByteClass::empty().representative(), None);
    }

    #[test]
    fn test_whitespace_members() {
        let ws = ByteClass::whitespace();
        for b in [b' ', b'\t', b'\n', b'\r', 0x0b, 0x0c] {
            assert!(ws.contains(b));
        }
        assert!(!ws.contains(b'x'));
    }
}
