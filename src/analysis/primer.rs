//! Primer candidates and their basic design metrics

use serde::{Deserialize, Serialize};

use super::bases::validate_sequence;
use super::complexity::linguistic_complexity;
use super::error::{Result, ThermoError};
use super::hairpin::{enumerate_hairpins, Hairpin};

/// Primers up to this length use the Wallace rule for Tm
pub const WALLACE_MAX_LEN: usize = 13;
/// Number of 3' bases inspected for the GC clamp
pub const GC_CLAMP_WINDOW: usize = 5;

/// A primer and where it sits on the template it was picked from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Primer {
    pub seq: String,
    /// Start offset on the template (0-based, inclusive)
    pub start: usize,
    /// End offset on the template (0-based, inclusive)
    pub end: usize,
}

impl Primer {
    pub fn new(seq: impl Into<String>, start: usize, end: usize) -> Result<Self> {
        let seq = seq.into();
        validate_sequence(&seq)?;
        if seq.is_empty() {
            return Err(ThermoError::SequenceTooShort {
                required: 1,
                actual: 0,
            });
        }
        if end < start {
            return Err(ThermoError::InvalidParameters(format!(
                "primer end {} lies before start {}",
                end, start
            )));
        }
        Ok(Self { seq, start, end })
    }

    fn count_gc(bases: &[u8]) -> usize {
        bases.iter().filter(|&&b| matches!(b, b'G' | b'C')).count()
    }

    /// Estimated melting temperature in °C.
    ///
    /// Wallace rule `2(A+T) + 4(G+C)` for short primers, otherwise
    /// `64.9 + 41(G+C - 16.4) / N`.
    pub fn melting_temperature(&self) -> f64 {
        let len = self.seq.len();
        let gc = Self::count_gc(self.seq.as_bytes()) as f64;
        let at = (len as f64) - gc;
        if len <= WALLACE_MAX_LEN {
            2.0 * at + 4.0 * gc
        } else {
            64.9 + 41.0 * (gc - 16.4) / len as f64
        }
    }

    /// Share of G and C bases, in percent
    pub fn gc_content(&self) -> f64 {
        Self::count_gc(self.seq.as_bytes()) as f64 / self.seq.len() as f64 * 100.0
    }

    /// Number of G/C among the last five bases
    pub fn gc_clamp(&self) -> usize {
        let bytes = self.seq.as_bytes();
        Self::count_gc(&bytes[bytes.len().saturating_sub(GC_CLAMP_WINDOW)..])
    }

    pub fn linguistic_complexity(&self) -> Result<f64> {
        linguistic_complexity(&self.seq)
    }

    /// Hairpin candidates the primer could fold into
    pub fn hairpins(&self) -> Result<Vec<Hairpin>> {
        enumerate_hairpins(&self.seq)
    }
}
