//! Encoded units (genes) and their fixed alphabets.
//!
//! A [`Gene`] is the smallest independently mutable piece of an encoded
//! solution: a fixed-length string whose characters are drawn from one
//! declared [`Alphabet`]. Mutation and crossover never change a gene's
//! length; the DNA string can only be replaced wholesale through the
//! validating setter.

use crate::error::Error;
use rand::Rng;

/// The set of characters a gene's DNA may contain.
///
/// Each variant is a fixed, ordered character set. Binary is the common
/// choice for numeric encodings; the others exist for problems that are
/// more naturally expressed in digits, letters, or nucleotides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Alphabet {
    /// `0` and `1`.
    Binary,
    /// Decimal digits `0`–`9`.
    Decimal,
    /// Uppercase ASCII letters `A`–`Z`.
    Uppercase,
    /// Nucleotide codes `A`, `T`, `C`, `G`.
    Nucleotide,
}

impl Alphabet {
    /// Returns the ordered character set of this alphabet.
    pub fn symbols(&self) -> &'static str {
        match self {
            Alphabet::Binary => "01",
            Alphabet::Decimal => "0123456789",
            Alphabet::Uppercase => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            Alphabet::Nucleotide => "ATCG",
        }
    }

    /// Returns whether `ch` is a member of this alphabet.
    pub fn contains(&self, ch: char) -> bool {
        self.symbols().contains(ch)
    }

    pub(crate) fn validate(&self, dna: &str) -> Result<(), Error> {
        match dna.chars().find(|&ch| !self.contains(ch)) {
            Some(character) => Err(Error::InvalidEncoding {
                character,
                alphabet: *self,
            }),
            None => Ok(()),
        }
    }
}

/// A fixed-length encoded unit over one alphabet.
///
/// Genes carry two diagnostic attributes with no engine-side behavior:
/// a `suppressed` flag and an optional `name`. Both survive cloning.
///
/// # Examples
///
/// ```
/// use evostrand::gene::{Alphabet, Gene};
///
/// let gene = Gene::new(Alphabet::Binary, "10110").unwrap();
/// assert_eq!(gene.length(), 5);
/// assert_eq!(gene.dna(), "10110");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gene {
    alphabet: Alphabet,
    dna: String,
    /// Whether expression of this gene is suppressed. Diagnostic only.
    pub suppressed: bool,
    /// Optional name for diagnostics.
    pub name: Option<String>,
}

impl Gene {
    /// Constructs a gene after validating every character of `dna`
    /// against `alphabet`.
    pub fn new(alphabet: Alphabet, dna: impl Into<String>) -> Result<Self, Error> {
        let dna = dna.into();
        alphabet.validate(&dna)?;
        Ok(Self {
            alphabet,
            dna,
            suppressed: false,
            name: None,
        })
    }

    /// Constructs a gene of `length` random characters sampled uniformly
    /// from `alphabet`.
    ///
    /// # Panics
    /// Panics if `length` is zero.
    pub fn create_random<R: Rng>(alphabet: Alphabet, length: usize, rng: &mut R) -> Self {
        assert!(length > 0, "gene length must be at least 1");
        let symbols = alphabet.symbols().as_bytes();
        let dna: String = (0..length)
            .map(|_| symbols[rng.random_range(0..symbols.len())] as char)
            .collect();
        Self {
            alphabet,
            dna,
            suppressed: false,
            name: None,
        }
    }

    /// Sets the diagnostic name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the suppression flag.
    pub fn with_suppressed(mut self, suppressed: bool) -> Self {
        self.suppressed = suppressed;
        self
    }

    /// Returns this gene's alphabet.
    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    /// Returns this gene's DNA string.
    pub fn dna(&self) -> &str {
        &self.dna
    }

    /// Returns the length of this gene's DNA string.
    pub fn length(&self) -> usize {
        self.dna.len()
    }

    /// Replaces this gene's DNA, validating every character against the
    /// alphabet.
    pub fn set_dna(&mut self, dna: impl Into<String>) -> Result<(), Error> {
        let dna = dna.into();
        self.alphabet.validate(&dna)?;
        self.dna = dna;
        Ok(())
    }

    /// Simulates mutation against a probability.
    ///
    /// Each position independently mutates with probability `p_mutate`.
    /// A mutated position is replaced by a character chosen uniformly from
    /// the *other* symbols of the alphabet, so a triggered mutation always
    /// changes the character. For the binary alphabet this is a plain flip.
    pub fn mutate<R: Rng>(&mut self, p_mutate: f64, rng: &mut R) {
        let symbols = self.alphabet.symbols().as_bytes();
        // Alphabets are ASCII, so byte-level replacement is safe.
        let mut bytes = std::mem::take(&mut self.dna).into_bytes();
        for byte in &mut bytes {
            if rng.random_range(0.0..1.0) < p_mutate {
                let current = symbols
                    .iter()
                    .position(|&s| s == *byte)
                    .expect("DNA characters are members of the alphabet");
                // Draw among the len-1 other symbols, skipping the current one.
                let drawn = rng.random_range(0..symbols.len() - 1);
                let replacement = if drawn >= current { drawn + 1 } else { drawn };
                *byte = symbols[replacement];
            }
        }
        self.dna = String::from_utf8(bytes).expect("alphabet symbols are valid UTF-8");
    }
}

impl std::fmt::Display for Gene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Gene")?;
        if let Some(name) = &self.name {
            write!(f, "[{name}]")?;
        }
        write!(f, "<{}>", self.dna)
    }
}
