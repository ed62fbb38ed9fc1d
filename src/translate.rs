//! Stateless translators from DNA to domain values.
//!
//! A [`Translator`] is a pure function of a gene's bits and holds no
//! population state. It separates raw genes/chromosomes from the logic a
//! fitness function needs to express them, the way cellular machinery
//! translates DNA into proteins. Raw-token decoding needs no translator at
//! all: the gene's own [`Gene::dna`] accessor is the token.

use crate::chromosome::Chromosome;
use crate::gene::{Alphabet, Gene};

/// Pure decoders from encoded bits to numeric values.
///
/// All decoders return `f64`; integer decodings are exact up to 2^53.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Translator {
    /// Interprets binary DNA as an unsigned base-2 integer.
    BinaryInt,

    /// Interprets binary DNA as a signed fixed-point real.
    ///
    /// Bit layout: `[sign] [significand] [exponent-sign] [exponent]`, where
    /// the leading sign bit is present only when `signed` is set and `'0'`
    /// means positive. The decoded value is
    /// `sign * significand * 10^(exponent_sign * exponent)`.
    ///
    /// Example: DNA `001111` with `significand_bits = 3` decodes as
    /// `+3 * 10^-1 = 0.3`.
    BinaryFloat {
        /// Number of bits holding the significand integer.
        significand_bits: usize,
        /// Whether the DNA starts with a sign bit.
        signed: bool,
    },

    /// Interprets decimal DNA directly as a base-10 integer.
    Base10Int,
}

impl Translator {
    /// Translates one gene into the value its DNA represents.
    ///
    /// # Panics
    /// Panics when the gene's alphabet or length cannot satisfy the
    /// decoder's layout; both are caller programming errors, not data
    /// conditions.
    pub fn decode_gene(&self, gene: &Gene) -> f64 {
        match *self {
            Translator::BinaryInt => {
                assert_eq!(
                    gene.alphabet(),
                    Alphabet::Binary,
                    "BinaryInt requires a binary gene"
                );
                radix_fold(gene.dna(), 2.0)
            }
            Translator::BinaryFloat {
                significand_bits,
                signed,
            } => {
                assert_eq!(
                    gene.alphabet(),
                    Alphabet::Binary,
                    "BinaryFloat requires a binary gene"
                );
                assert!(significand_bits >= 1, "significand needs at least one bit");
                let dna = gene.dna();
                let offset = usize::from(signed);
                // Layout needs the significand, an exponent sign bit, and
                // at least one exponent bit.
                assert!(
                    dna.len() >= offset + significand_bits + 2,
                    "gene too short for the fixed-point layout"
                );

                let sign = if signed && dna.as_bytes()[0] == b'1' {
                    -1.0
                } else {
                    1.0
                };
                let significand = radix_fold(&dna[offset..offset + significand_bits], 2.0);
                let exponent_sign = if dna.as_bytes()[offset + significand_bits] == b'1' {
                    -1.0
                } else {
                    1.0
                };
                let exponent = radix_fold(&dna[offset + significand_bits + 1..], 2.0);

                // Integral exponent, so powi keeps small powers exact.
                sign * significand * 10f64.powi((exponent_sign * exponent) as i32)
            }
            Translator::Base10Int => {
                assert!(
                    matches!(gene.alphabet(), Alphabet::Decimal | Alphabet::Binary),
                    "Base10Int requires digit DNA"
                );
                radix_fold(gene.dna(), 10.0)
            }
        }
    }

    /// Translates every gene in a chromosome, preserving gene order.
    pub fn decode_chromosome(&self, chromosome: &Chromosome) -> Vec<f64> {
        chromosome.iter().map(|gene| self.decode_gene(gene)).collect()
    }
}

/// Folds an ASCII digit string into its value in the given radix.
fn radix_fold(digits: &str, radix: f64) -> f64 {
    digits
        .bytes()
        .fold(0.0, |acc, b| acc * radix + f64::from(b - b'0'))
}
