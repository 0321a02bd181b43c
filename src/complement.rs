//! Nucleotide complement lookup
//!
//! The table covers the four canonical bases and the IUPAC ambiguity codes in both
//! cases. Bytes without a pairing partner (line breaks, header text, `U`, digits, ...)
//! map to themselves so the table stays self-inverse.

/// Process-wide complement table, built at compile time
pub static COMPLEMENT: ComplementTable = ComplementTable::new();

/// Base pairs as `(base, complement)`; both directions are inserted
const PAIRS: [(u8, u8); 6] = [
    (b'A', b'T'),
    (b'C', b'G'),
    (b'R', b'Y'),
    (b'K', b'M'),
    (b'B', b'V'),
    (b'D', b'H'),
];

/// Byte-to-byte complement mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplementTable {
    table: [u8; 256],
}

impl ComplementTable {
    /// Builds the table: identity everywhere, then the upper and lower case pairs
    #[must_use]
    pub const fn new() -> Self {
        let mut table = [0u8; 256];
        let mut i = 0;
        while i < 256 {
            table[i] = i as u8;
            i += 1;
        }

        let mut p = 0;
        while p < PAIRS.len() {
            let (a, b) = PAIRS[p];
            table[a as usize] = b;
            table[b as usize] = a;
            table[a.to_ascii_lowercase() as usize] = b.to_ascii_lowercase();
            table[b.to_ascii_lowercase() as usize] = a.to_ascii_lowercase();
            p += 1;
        }

        Self { table }
    }

    /// Returns the complement of a single byte
    #[inline]
    #[must_use]
    pub fn complement(&self, byte: u8) -> u8 {
        self.table[byte as usize]
    }

    /// Reverse complements an unwrapped sequence in place
    ///
    /// The sequence must not contain line breaks; they would be moved along with the bases.
    pub fn reverse_complement(&self, seq: &mut [u8]) {
        let mid = seq.len() / 2;
        let (left, right) = seq.split_at_mut(mid);
        if right.len() > left.len() {
            right[0] = self.complement(right[0]);
        }
        let offset = right.len() - left.len();
        for (x, y) in left.iter_mut().zip(right[offset..].iter_mut().rev()) {
            let l = *x;
            *x = self.complement(*y);
            *y = self.complement(l);
        }
    }
}

impl Default for ComplementTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod testing {
    use super::*;

    #[test]
    fn test_canonical_pairs() {
        assert_eq!(COMPLEMENT.complement(b'A'), b'T');
        assert_eq!(COMPLEMENT.complement(b'T'), b'A');
        assert_eq!(COMPLEMENT.complement(b'C'), b'G');
        assert_eq!(COMPLEMENT.complement(b'G'), b'C');
        assert_eq!(COMPLEMENT.complement(b'a'), b't');
        assert_eq!(COMPLEMENT.complement(b'g'), b'c');
    }

    #[test]
    fn test_ambiguity_codes() {
        for (base, comp) in [
            (b'R', b'Y'),
            (b'M', b'K'),
            (b'V', b'B'),
            (b'H', b'D'),
            (b'S', b'S'),
            (b'W', b'W'),
            (b'N', b'N'),
            (b'n', b'n'),
            (b'y', b'r'),
        ] {
            assert_eq!(COMPLEMENT.complement(base), comp, "{}", base as char);
        }
    }

    #[test]
    fn test_passthrough() {
        for byte in [b'\n', b'>', b' ', b'0', b'U', b'x', 0u8, 200u8] {
            assert_eq!(COMPLEMENT.complement(byte), byte);
        }
    }

    #[test]
    fn test_self_inverse() {
        for byte in 0..=u8::MAX {
            assert_eq!(COMPLEMENT.complement(COMPLEMENT.complement(byte)), byte);
        }
    }

    #[test]
    fn test_reverse_complement_even_and_odd() {
        let mut seq = b"AAAACCCC".to_vec();
        COMPLEMENT.reverse_complement(&mut seq);
        assert_eq!(&seq, b"GGGGTTTT");

        let mut seq = b"ACGTA".to_vec();
        COMPLEMENT.reverse_complement(&mut seq);
        assert_eq!(&seq, b"TACGT");

        let mut seq = b"G".to_vec();
        COMPLEMENT.reverse_complement(&mut seq);
        assert_eq!(&seq, b"C");

        let mut seq: Vec<u8> = Vec::new();
        COMPLEMENT.reverse_complement(&mut seq);
        assert!(seq.is_empty());
    }
}
