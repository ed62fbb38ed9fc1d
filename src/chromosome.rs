//! Encoded sequences (chromosomes).
//!
//! A [`Chromosome`] is an ordered list of exclusively owned [`Gene`]s whose
//! concatenated DNA forms one candidate solution. Two variants share the
//! same mutate/crossover surface:
//!
//! - the **freeform** variant splices full DNA strings at a crossover point
//!   and delegates mutation to each gene;
//! - the **reordering-set** variant holds each DNA string of a fixed,
//!   duplicate-free choice set exactly once, and replaces splicing and
//!   per-character mutation with position swaps that preserve the set.
//!
//! The engine never needs to know which variant it holds.

use crate::error::Error;
use crate::gene::{Alphabet, Gene};
use rand::Rng;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
enum Variant {
    Freeform,
    ReorderingSet {
        choices: Vec<String>,
        choice_set: HashSet<String>,
    },
}

/// An ordered strand of genes forming one candidate solution.
///
/// # Examples
///
/// ```
/// use evostrand::chromosome::Chromosome;
/// use evostrand::gene::{Alphabet, Gene};
///
/// let genes = vec![
///     Gene::new(Alphabet::Binary, "100100").unwrap(),
///     Gene::new(Alphabet::Binary, "011011").unwrap(),
/// ];
/// let mut chromosome = Chromosome::new(genes);
/// assert_eq!(chromosome.dna(), "100100011011");
///
/// // New DNA is re-partitioned across the genes in order.
/// chromosome.set_dna("111111000000").unwrap();
/// assert_eq!(chromosome.genes()[0].dna(), "111111");
/// assert_eq!(chromosome.genes()[1].dna(), "000000");
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromosome {
    genes: Vec<Gene>,
    variant: Variant,
}

impl Chromosome {
    /// Constructs a freeform chromosome from at least one gene.
    ///
    /// # Panics
    /// Panics if `genes` is empty.
    pub fn new(genes: Vec<Gene>) -> Self {
        assert!(!genes.is_empty(), "chromosome requires at least one gene");
        Self {
            genes,
            variant: Variant::Freeform,
        }
    }

    /// Constructs a reordering-set chromosome.
    ///
    /// `choices` declares the fixed, duplicate-free set of DNA strings this
    /// chromosome may permute. The supplied genes must carry each choice
    /// exactly once.
    pub fn reordering_set(genes: Vec<Gene>, choices: Vec<String>) -> Result<Self, Error> {
        assert!(!genes.is_empty(), "chromosome requires at least one gene");
        let mut choice_set = HashSet::with_capacity(choices.len());
        for choice in &choices {
            if !choice_set.insert(choice.clone()) {
                return Err(Error::DuplicateChoice(choice.clone()));
            }
        }
        let gene_set: HashSet<&str> = genes.iter().map(|g| g.dna()).collect();
        if genes.len() != choices.len()
            || gene_set.len() != genes.len()
            || !gene_set.iter().all(|dna| choice_set.contains(*dna))
        {
            return Err(Error::IncompleteChoiceSet);
        }
        Ok(Self {
            genes,
            variant: Variant::ReorderingSet {
                choices,
                choice_set,
            },
        })
    }

    /// Builds `count` independent freeform chromosomes with one random gene
    /// per declared length. A one-element `lengths` slice is the common
    /// single-gene case.
    ///
    /// # Panics
    /// Panics if `lengths` is empty or contains a zero.
    pub fn create_random<R: Rng>(
        alphabet: Alphabet,
        lengths: &[usize],
        count: usize,
        rng: &mut R,
    ) -> Vec<Chromosome> {
        assert!(!lengths.is_empty(), "at least one gene length is required");
        (0..count)
            .map(|_| {
                let genes = lengths
                    .iter()
                    .map(|&len| Gene::create_random(alphabet, len, rng))
                    .collect();
                Chromosome::new(genes)
            })
            .collect()
    }

    /// Returns the genes in order.
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    /// Iterates over the genes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Gene> {
        self.genes.iter()
    }

    /// Returns the full DNA string: the in-order concatenation of every
    /// gene's DNA.
    pub fn dna(&self) -> String {
        self.genes.iter().map(Gene::dna).collect()
    }

    /// Returns the total DNA length across all genes.
    pub fn length(&self) -> usize {
        self.genes.iter().map(Gene::length).sum()
    }

    /// Returns whether this chromosome enforces the reordering-set
    /// invariant.
    pub fn is_reordering_set(&self) -> bool {
        matches!(self.variant, Variant::ReorderingSet { .. })
    }

    pub(crate) fn same_variant(&self, other: &Chromosome) -> bool {
        std::mem::discriminant(&self.variant) == std::mem::discriminant(&other.variant)
    }

    /// Replaces this chromosome's full DNA with a string of equal length,
    /// re-partitioning it across the genes in their existing order and
    /// lengths.
    pub fn set_dna(&mut self, dna: &str) -> Result<(), Error> {
        let expected = self.length();
        if dna.len() != expected {
            return Err(Error::LengthMismatch {
                expected,
                actual: dna.len(),
            });
        }
        // Validate every slice up front so a failure cannot leave the
        // chromosome partially rewritten. Walk by chars, not byte ranges:
        // a multibyte character must surface as InvalidEncoding, never as
        // a slicing panic. Alphabets are ASCII, so validated DNA is safe
        // to re-partition by byte offset afterwards.
        let mut chars = dna.chars();
        for gene in &self.genes {
            let slice: String = chars.by_ref().take(gene.length()).collect();
            gene.alphabet().validate(&slice)?;
        }
        self.write_dna(dna);
        Ok(())
    }

    /// Infallible DNA re-partition for internal callers that already hold
    /// alphabet-valid DNA of the right length (crossover splices, elitism
    /// injection).
    pub(crate) fn write_dna(&mut self, dna: &str) {
        assert_eq!(dna.len(), self.length(), "DNA length mismatch");
        let mut offset = 0;
        for gene in &mut self.genes {
            let len = gene.length();
            gene.set_dna(&dna[offset..offset + len])
                .expect("DNA characters fit each gene's alphabet");
            offset += len;
        }
    }

    /// Exchanges DNA with another chromosome of equal total length at a
    /// common point in `[0, length)`.
    ///
    /// Freeform variant: both chromosomes are re-assigned from the spliced
    /// strings (this-prefix + other-suffix and vice versa). Point 0
    /// degenerates to a full swap. Only the two participants change.
    ///
    /// Reordering-set variant: a single positional unit swap instead of a
    /// bit splice. The gene of `other` covering bit-offset `point` is
    /// located, the gene with matching DNA is found in `self`, and the two
    /// positions are swapped within `self`, preserving the choice set.
    ///
    /// # Panics
    /// Panics if the lengths differ, if `point` is out of range, or — for
    /// the reordering-set variant — if the set invariant breaks afterwards
    /// (an operator bug, not a data condition).
    pub fn crossover(&mut self, other: &mut Chromosome, point: usize) {
        assert_eq!(
            self.length(),
            other.length(),
            "crossover requires equal total length"
        );
        assert!(point < self.length(), "crossover point out of range");

        if self.is_reordering_set() {
            // Locate the gene of `other` covering bit-offset `point` by
            // accumulating gene lengths until the sum exceeds it.
            let mut accumulated = 0;
            let mut other_idx = 0;
            for (i, gene) in other.genes.iter().enumerate() {
                accumulated += gene.length();
                if point < accumulated {
                    other_idx = i;
                    break;
                }
            }
            let target = other.genes[other_idx].dna().to_owned();
            if let Some(matching) = self.genes.iter().position(|g| g.dna() == target) {
                self.genes.swap(other_idx, matching);
            }
            self.check_choice_set();
        } else {
            let a = self.dna();
            let b = other.dna();
            let new_a = format!("{}{}", &a[..point], &b[point..]);
            let new_b = format!("{}{}", &b[..point], &a[point..]);
            self.write_dna(&new_a);
            other.write_dna(&new_b);
        }
    }

    /// Checks every gene for mutation at rate `p_mutate`.
    ///
    /// Freeform variant: delegates to [`Gene::mutate`]. Reordering-set
    /// variant: each gene position independently swaps with a distinct
    /// random other position, preserving the exact multiset of genes; the
    /// set invariant is re-validated afterwards.
    pub fn mutate<R: Rng>(&mut self, p_mutate: f64, rng: &mut R) {
        assert!(
            (0.0..=1.0).contains(&p_mutate),
            "p_mutate must lie in [0, 1]"
        );
        if self.is_reordering_set() {
            let n = self.genes.len();
            if n < 2 {
                return;
            }
            for i in 0..n {
                if rng.random_range(0.0..1.0) < p_mutate {
                    // Pick among the n-1 other positions, never i itself.
                    let drawn = rng.random_range(0..n - 1);
                    let j = if drawn >= i { drawn + 1 } else { drawn };
                    self.genes.swap(i, j);
                }
            }
            self.check_choice_set();
        } else {
            for gene in &mut self.genes {
                gene.mutate(p_mutate, rng);
            }
        }
    }

    /// Asserts the reordering-set invariant: the multiset of gene DNA
    /// strings equals the declared choice set exactly once each. A breach
    /// here is a bug in a set-preserving operator and aborts.
    fn check_choice_set(&self) {
        if let Variant::ReorderingSet {
            ref choices,
            ref choice_set,
        } = self.variant
        {
            assert_eq!(
                self.genes.len(),
                choices.len(),
                "reordering-set invariant violated: gene count changed"
            );
            let gene_set: HashSet<&str> = self.genes.iter().map(|g| g.dna()).collect();
            assert!(
                gene_set.len() == self.genes.len()
                    && gene_set.iter().all(|dna| choice_set.contains(*dna)),
                "reordering-set invariant violated: genes no longer cover the choice set"
            );
        }
    }
}

impl std::fmt::Display for Chromosome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined: Vec<&str> = self.genes.iter().map(Gene::dna).collect();
        write!(f, "Chromosome<{}>", joined.join(","))
    }
}
