//! Hairpin structures and their sliding-window enumeration
//!
//! A hairpin splits a sequence into `stem1 | loop | stem2`. Candidates are
//! produced by one monotone sliding window: starting from the shortest stem1
//! and loop, the loop alternately grows from 4 to 5 bases (eating the front of
//! stem2) and shrinks back to 4 (feeding the end of stem1), until stem2 is down
//! to two bases.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::bases::validate_sequence;
use super::error::{Result, ThermoError};

/// Shortest stem that can form a stacked pair step
pub const MIN_STEM_LEN: usize = 2;
/// Loop floor; the loop never holds fewer unpaired bases
pub const MIN_LOOP_LEN: usize = 4;
/// Loop ceiling reached before stem1 takes over a base
pub const MAX_LOOP_LEN: usize = 5;
/// Shortest sequence that folds into an initial hairpin
pub const MIN_HAIRPIN_SEQ_LEN: usize = 2 * MIN_STEM_LEN + MIN_LOOP_LEN;

/// Hairpin DNA structure: `stem1` folds back across `loop_seq` onto `stem2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawHairpin")]
pub struct Hairpin {
    stem1: String,
    #[serde(rename = "loop")]
    loop_seq: String,
    stem2: String,
}

/// Wire form of a [`Hairpin`]; checked through [`Hairpin::new`] on the way in.
#[derive(Deserialize)]
struct RawHairpin {
    stem1: String,
    #[serde(rename = "loop")]
    loop_seq: String,
    stem2: String,
}

impl TryFrom<RawHairpin> for Hairpin {
    type Error = ThermoError;

    fn try_from(raw: RawHairpin) -> Result<Self> {
        Self::new(raw.stem1, raw.loop_seq, raw.stem2)
    }
}

impl Hairpin {
    /// Create a hairpin from its three segments.
    ///
    /// All segments must be ACGT, `stem1` needs at least [`MIN_STEM_LEN`] and
    /// the loop at least [`MIN_LOOP_LEN`] bases. `stem2` is not constrained
    /// here; an empty `stem2` is rejected when scoring.
    pub fn new(
        stem1: impl Into<String>,
        loop_seq: impl Into<String>,
        stem2: impl Into<String>,
    ) -> Result<Self> {
        let (stem1, loop_seq, stem2) = (stem1.into(), loop_seq.into(), stem2.into());
        validate_sequence(&stem1)?;
        validate_sequence(&loop_seq).map_err(|e| shift_position(e, stem1.len()))?;
        validate_sequence(&stem2)
            .map_err(|e| shift_position(e, stem1.len() + loop_seq.len()))?;

        if stem1.len() < MIN_STEM_LEN {
            return Err(ThermoError::SequenceTooShort {
                required: MIN_STEM_LEN,
                actual: stem1.len(),
            });
        }
        if loop_seq.len() < MIN_LOOP_LEN {
            return Err(ThermoError::SequenceTooShort {
                required: MIN_LOOP_LEN,
                actual: loop_seq.len(),
            });
        }
        Ok(Self::from_parts(stem1, loop_seq, stem2))
    }

    fn from_parts(stem1: String, loop_seq: String, stem2: String) -> Self {
        Self {
            stem1,
            loop_seq,
            stem2,
        }
    }

    /// Bases from the 5' end up to the loop (exclusive)
    pub fn stem1(&self) -> &str {
        &self.stem1
    }

    /// Unpaired loop bases
    pub fn loop_seq(&self) -> &str {
        &self.loop_seq
    }

    /// Bases from the end of the loop (exclusive) to the 3' end
    pub fn stem2(&self) -> &str {
        &self.stem2
    }

    /// Number of stem positions that can be compared
    pub fn min_stem_len(&self) -> usize {
        self.stem1.len().min(self.stem2.len())
    }

    /// Total number of bases in the structure
    pub fn len(&self) -> usize {
        self.stem1.len() + self.loop_seq.len() + self.stem2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn shift_position(err: ThermoError, offset: usize) -> ThermoError {
    match err {
        ThermoError::InvalidBase { base, position } => ThermoError::InvalidBase {
            base,
            position: position + offset,
        },
        other => other,
    }
}

impl fmt::Display for Hairpin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stem1: {}\nLoop: {}\nStem2: {}",
            self.stem1, self.loop_seq, self.stem2
        )
    }
}

/// Lazy sliding-window enumeration of hairpin candidates over one sequence.
#[derive(Debug, Clone)]
pub struct HairpinWindows<'a> {
    seq: &'a str,
    /// End of stem1 / start of the loop
    split1: usize,
    /// End of the loop / start of stem2
    split2: usize,
    started: bool,
}

impl<'a> HairpinWindows<'a> {
    /// Validate `seq` and set up the tightest window.
    ///
    /// Sequences shorter than [`MIN_HAIRPIN_SEQ_LEN`] yield no candidates.
    pub fn new(seq: &'a str) -> Result<Self> {
        validate_sequence(seq)?;
        Ok(Self {
            seq,
            split1: MIN_STEM_LEN,
            split2: MIN_STEM_LEN + MIN_LOOP_LEN,
            started: seq.len() < MIN_HAIRPIN_SEQ_LEN,
        })
    }

    fn current(&self) -> Hairpin {
        Hairpin::from_parts(
            self.seq[..self.split1].to_string(),
            self.seq[self.split1..self.split2].to_string(),
            self.seq[self.split2..].to_string(),
        )
    }

    /// Move one base across the window; false once the loosest hairpin is reached.
    fn advance(&mut self) -> bool {
        let stem2_len = self.seq.len() - self.split2;
        let loop_len = self.split2 - self.split1;
        if stem2_len <= MIN_STEM_LEN && loop_len <= MIN_LOOP_LEN {
            return false;
        }
        if loop_len == MIN_LOOP_LEN {
            self.split2 += 1;
        } else {
            self.split1 += 1;
        }
        debug_assert!(self.split2 - self.split1 <= MAX_LOOP_LEN);
        true
    }

    fn remaining(&self) -> usize {
        if self.seq.len() < MIN_HAIRPIN_SEQ_LEN {
            return 0;
        }
        let stem2_excess = self.seq.len() - self.split2 - MIN_STEM_LEN;
        let loop_excess = self.split2 - self.split1 - MIN_LOOP_LEN;
        let after = 2 * stem2_excess + loop_excess;
        if self.started {
            after
        } else {
            after + 1
        }
    }
}

impl Iterator for HairpinWindows<'_> {
    type Item = Hairpin;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.started {
            self.started = true;
            return Some(self.current());
        }
        if self.seq.len() < MIN_HAIRPIN_SEQ_LEN || !self.advance() {
            return None;
        }
        Some(self.current())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for HairpinWindows<'_> {}

/// Enumerate all hairpin candidates of `seq`, from the tightest (longest
/// stem2) to the loosest. For a sequence of length L >= 8 this yields
/// `2 * (L - 8) + 1` candidates; shorter sequences yield none.
pub fn enumerate_hairpins(seq: &str) -> Result<Vec<Hairpin>> {
    let hairpins: Vec<Hairpin> = HairpinWindows::new(seq)?.collect();
    log::debug!(
        "enumerated {} hairpin candidates for a {} nt sequence",
        hairpins.len(),
        seq.len()
    );
    Ok(hairpins)
}
