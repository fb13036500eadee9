// DNA letter tables and small sequence helpers shared by the analyses.

#[derive(Clone, Debug)]
pub struct Facility {
    dna_complement: [u8; 256],
    dna_iupac: [bool; 256],
}

impl Default for Facility {
    fn default() -> Self {
        Self::new()
    }
}

impl Facility {
    pub fn new() -> Self {
        Self {
            dna_complement: Self::initialize_dna_complement(),
            dna_iupac: Self::initialize_dna_iupac(),
        }
    }

    /// Complement of a single base. Letters without a defined complement
    /// (degenerate codes, junk) are returned unchanged.
    #[inline(always)]
    pub fn complement(&self, base: u8) -> u8 {
        self.dna_complement[base as usize]
    }

    #[inline(always)]
    pub fn is_iupac_letter(&self, letter: u8) -> bool {
        self.dna_iupac[letter as usize]
    }

    pub fn reverse_complement(&self, sequence: &str) -> String {
        sequence
            .bytes()
            .rev()
            .map(|base| self.complement(base) as char)
            .collect()
    }

    /// True if the sequence reads the same as its own reverse complement.
    pub fn is_palindromic(&self, sequence: &str) -> bool {
        sequence == self.reverse_complement(sequence)
    }

    /// Fraction of G/C letters, case-insensitive. Zero for an empty string.
    pub fn gc_fraction(&self, sequence: &str) -> f64 {
        if sequence.is_empty() {
            return 0.0;
        }
        let gc = sequence
            .bytes()
            .filter(|base| matches!(base.to_ascii_uppercase(), b'G' | b'C'))
            .count();
        gc as f64 / sequence.len() as f64
    }

    /// Uppercases and drops every character outside the IUPAC DNA alphabet.
    pub fn clean_dna_text(&self, text: &str) -> String {
        text.bytes()
            .map(|b| b.to_ascii_uppercase())
            .filter(|&b| self.is_iupac_letter(b))
            .map(|b| b as char)
            .collect()
    }

    /// Substring of an ASCII sequence with both bounds clamped to the
    /// buffer. Coordinates may be negative or past the end; an empty or
    /// inverted window yields an empty string.
    pub fn clamped_substring(&self, sequence: &str, start: i64, end: i64) -> String {
        let len = sequence.len() as i64;
        let start = start.clamp(0, len) as usize;
        let end = end.clamp(0, len) as usize;
        if end <= start {
            return String::new();
        }
        String::from_utf8_lossy(&sequence.as_bytes()[start..end]).into_owned()
    }

    fn initialize_dna_complement() -> [u8; 256] {
        let mut table = [0u8; 256];
        for (i, entry) in table.iter_mut().enumerate() {
            *entry = i as u8;
        }
        for (base, complement) in [
            (b'A', b'T'),
            (b'T', b'A'),
            (b'G', b'C'),
            (b'C', b'G'),
            (b'a', b't'),
            (b't', b'a'),
            (b'g', b'c'),
            (b'c', b'g'),
        ] {
            table[base as usize] = complement;
        }
        table
    }

    fn initialize_dna_iupac() -> [bool; 256] {
        let mut table = [false; 256];
        for letter in b"ACGTRYSWKMBDHVN" {
            table[*letter as usize] = true;
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use crate::FACILITY;

    #[test]
    fn test_complement() {
        assert_eq!(FACILITY.complement(b'A'), b'T');
        assert_eq!(FACILITY.complement(b'C'), b'G');
        assert_eq!(FACILITY.complement(b'G'), b'C');
        assert_eq!(FACILITY.complement(b'T'), b'A');
        assert_eq!(FACILITY.complement(b'N'), b'N');
        assert_eq!(FACILITY.complement(b'X'), b'X');
    }

    #[test]
    fn test_reverse_complement() {
        assert_eq!(FACILITY.reverse_complement("GGTCTC"), "GAGACC");
        assert_eq!(FACILITY.reverse_complement("AATG"), "CATT");
        assert_eq!(FACILITY.reverse_complement(""), "");
    }

    #[test]
    fn test_palindromic() {
        assert!(FACILITY.is_palindromic("AATT"));
        assert!(FACILITY.is_palindromic("GATC"));
        assert!(!FACILITY.is_palindromic("GGAG"));
        assert!(!FACILITY.is_palindromic("AATG"));
    }

    #[test]
    fn test_gc_fraction() {
        assert_eq!(FACILITY.gc_fraction("AAAA"), 0.0);
        assert_eq!(FACILITY.gc_fraction("GGGG"), 1.0);
        assert_eq!(FACILITY.gc_fraction("ATGC"), 0.5);
        assert_eq!(FACILITY.gc_fraction("atgc"), 0.5);
        assert_eq!(FACILITY.gc_fraction(""), 0.0);
    }

    #[test]
    fn test_clean_dna_text() {
        assert_eq!(FACILITY.clean_dna_text("atg c\n123!tag"), "ATGCTAG");
        assert_eq!(FACILITY.clean_dna_text("RYSWKMBDHVN"), "RYSWKMBDHVN");
        assert_eq!(FACILITY.clean_dna_text("uU"), "");
    }

    #[test]
    fn test_clamped_substring() {
        assert_eq!(FACILITY.clamped_substring("GGTCTC", 1, 5), "GTCT");
        assert_eq!(FACILITY.clamped_substring("GGTCTC", -2, 3), "GGT");
        assert_eq!(FACILITY.clamped_substring("GGTCTC", 4, 99), "TC");
        assert_eq!(FACILITY.clamped_substring("GGTCTC", 5, 2), "");
        assert_eq!(FACILITY.clamped_substring("", 0, 4), "");
    }
}
