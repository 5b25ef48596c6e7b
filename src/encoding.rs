//! Encoding and decoding definitions for genotype symbols.
//!
//! Simulator output stores one ASCII digit per locus and individual. The digit counts the
//! number of parent-2 alleles at that locus.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Genotype {
    /// Homozygous for parent 1.
    HomozygousP1,
    Heterozygous,
    /// Homozygous for parent 2.
    HomozygousP2,
}

pub trait Symbol:
    std::marker::Sized
    + Copy
    + Clone
    + Send
    + Sync
    + std::fmt::Debug
    + std::cmp::PartialEq
    + std::cmp::Eq
    + std::hash::Hash
    + std::fmt::Display
    + 'static
{
    const SIZE: usize;
    fn try_decode(s: &u8) -> Option<Self>;
    fn encode(&self) -> u8;
    fn index(&self) -> usize;
}

impl Symbol for Genotype {
    const SIZE: usize = 3;

    fn try_decode(s: &u8) -> Option<Self> {
        match s {
            0x30 => Some(Genotype::HomozygousP1),
            0x31 => Some(Genotype::Heterozygous),
            0x32 => Some(Genotype::HomozygousP2),
            _ => None,
        }
    }

    fn encode(&self) -> u8 {
        match self {
            Genotype::HomozygousP1 => 0x30,
            Genotype::Heterozygous => 0x31,
            Genotype::HomozygousP2 => 0x32,
        }
    }

    fn index(&self) -> usize {
        match self {
            Genotype::HomozygousP1 => 0,
            Genotype::Heterozygous => 1,
            Genotype::HomozygousP2 => 2,
        }
    }
}

impl Genotype {
    /// Decode a numeric code as stored in archives.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Genotype::HomozygousP1),
            1 => Some(Genotype::Heterozygous),
            2 => Some(Genotype::HomozygousP2),
            _ => None,
        }
    }

    /// Fraction of parent-2 ancestry carried by the genotype.
    pub fn dosage(&self) -> f64 {
        match self {
            Genotype::HomozygousP1 => 0.,
            Genotype::Heterozygous => 0.5,
            Genotype::HomozygousP2 => 1.,
        }
    }

    /// One-hot encoding over the three genotype classes.
    pub fn one_hot(&self) -> [bool; 3] {
        let mut encoded = [false; 3];
        encoded[self.index()] = true;
        encoded
    }
}

impl std::fmt::Display for Genotype {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.encode() as char)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_ascii_digits() {
        assert_eq!(Genotype::try_decode(&b'0'), Some(Genotype::HomozygousP1));
        assert_eq!(Genotype::try_decode(&b'2'), Some(Genotype::HomozygousP2));
        assert_eq!(Genotype::try_decode(&b'3'), None);
        assert_eq!(Genotype::try_decode(&1), None);
    }

    #[test]
    fn decode_numeric_codes() {
        assert_eq!(Genotype::from_code(1), Some(Genotype::Heterozygous));
        assert_eq!(Genotype::from_code(3), None);
        assert_eq!(Genotype::from_code(b'1'), None);
    }

    #[test]
    fn one_hot_sets_single_flag() {
        assert_eq!(Genotype::HomozygousP1.one_hot(), [true, false, false]);
        assert_eq!(Genotype::Heterozygous.one_hot(), [false, true, false]);
        assert_eq!(Genotype::HomozygousP2.one_hot(), [false, false, true]);
    }

    #[test]
    fn dosage_scale() {
        assert_eq!(Genotype::Heterozygous.dosage(), 0.5);
        assert_eq!(Genotype::HomozygousP2.to_string(), "2");
    }
}
