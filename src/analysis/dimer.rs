//! Dimer structures: two strands paired antiparallel across an overlap window

use bio::alphabets::dna;
use serde::{Deserialize, Serialize};

use super::bases::validate_sequence;
use super::error::{Result, ThermoError};

/// Two sequences paired across an overlap region.
///
/// Offsets are 0-based and inclusive. The windows pair antiparallel:
/// base `i` of the reversed first window faces base `i` of the second window.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDimer")]
pub struct Dimer {
    seq1: String,
    seq2: String,
    overlap_start1: usize,
    overlap_end1: usize,
    overlap_start2: usize,
    overlap_end2: usize,
}

/// Wire form of a [`Dimer`]; checked through [`Dimer::new`] on the way in.
#[derive(Deserialize)]
struct RawDimer {
    seq1: String,
    seq2: String,
    overlap_start1: usize,
    overlap_end1: usize,
    overlap_start2: usize,
    overlap_end2: usize,
}

impl TryFrom<RawDimer> for Dimer {
    type Error = ThermoError;

    fn try_from(raw: RawDimer) -> Result<Self> {
        Self::new(
            raw.seq1,
            raw.seq2,
            raw.overlap_start1,
            raw.overlap_end1,
            raw.overlap_start2,
            raw.overlap_end2,
        )
    }
}

impl Dimer {
    pub fn new(
        seq1: impl Into<String>,
        seq2: impl Into<String>,
        overlap_start1: usize,
        overlap_end1: usize,
        overlap_start2: usize,
        overlap_end2: usize,
    ) -> Result<Self> {
        let (seq1, seq2) = (seq1.into(), seq2.into());
        validate_sequence(&seq1)?;
        validate_sequence(&seq2)?;

        if overlap_start1 > overlap_end1 || overlap_start2 > overlap_end2 {
            return Err(ThermoError::StructureTooShort);
        }
        for (end, len) in [(overlap_end1, seq1.len()), (overlap_end2, seq2.len())] {
            if end >= len {
                return Err(ThermoError::SequenceTooShort {
                    required: end + 1,
                    actual: len,
                });
            }
        }
        let first = overlap_end1 - overlap_start1 + 1;
        let second = overlap_end2 - overlap_start2 + 1;
        if first != second {
            return Err(ThermoError::OverlapMismatch { first, second });
        }

        Ok(Self {
            seq1,
            seq2,
            overlap_start1,
            overlap_end1,
            overlap_start2,
            overlap_end2,
        })
    }

    pub fn seq1(&self) -> &str {
        &self.seq1
    }

    pub fn seq2(&self) -> &str {
        &self.seq2
    }

    /// Inclusive overlap offsets on `seq1`
    pub fn overlap1(&self) -> (usize, usize) {
        (self.overlap_start1, self.overlap_end1)
    }

    /// Inclusive overlap offsets on `seq2`
    pub fn overlap2(&self) -> (usize, usize) {
        (self.overlap_start2, self.overlap_end2)
    }

    pub fn overlap_len(&self) -> usize {
        self.overlap_end1 - self.overlap_start1 + 1
    }

    /// Overlapping bases of `seq1`, 5' to 3'
    pub fn window1(&self) -> &str {
        &self.seq1[self.overlap_start1..=self.overlap_end1]
    }

    /// Overlapping bases of `seq2`, 5' to 3'
    pub fn window2(&self) -> &str {
        &self.seq2[self.overlap_start2..=self.overlap_end2]
    }

    /// Both windows are the same self-complementary sequence.
    pub fn is_symmetric(&self) -> bool {
        let window = self.window1().as_bytes();
        window == self.window2().as_bytes() && dna::revcomp(window) == window
    }
}

/// Enumerate every antiparallel register of `seq1` against `seq2` whose overlap
/// holds at least `min_overlap` bases.
///
/// Register `k` pairs `seq1[x]` with `seq2[k - x]`; registers are listed in
/// increasing `k`, i.e. starting with the 5' end of `seq1` facing the 5' end of
/// `seq2`. A self-dimer screen passes the same sequence twice.
pub fn enumerate_dimers(seq1: &str, seq2: &str, min_overlap: usize) -> Result<Vec<Dimer>> {
    validate_sequence(seq1)?;
    validate_sequence(seq2)?;

    let (len1, len2) = (seq1.len(), seq2.len());
    let mut dimers = Vec::new();
    if len1 == 0 || len2 == 0 {
        return Ok(dimers);
    }

    let min_overlap = min_overlap.max(1);
    for k in 0..(len1 + len2 - 1) {
        let x_min = k.saturating_sub(len2 - 1);
        let x_max = k.min(len1 - 1);
        if x_max - x_min + 1 < min_overlap {
            continue;
        }
        dimers.push(Dimer {
            seq1: seq1.to_string(),
            seq2: seq2.to_string(),
            overlap_start1: x_min,
            overlap_end1: x_max,
            overlap_start2: k - x_max,
            overlap_end2: k - x_min,
        });
    }

    log::debug!(
        "enumerated {} dimer registers ({} nt x {} nt, min overlap {})",
        dimers.len(),
        len1,
        len2,
        min_overlap
    );
    Ok(dimers)
}
