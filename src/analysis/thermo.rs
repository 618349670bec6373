//! Nearest-neighbor scoring of hairpin and dimer structures
//!
//! Both structure kinds reduce to the same stem alignment: the first strand
//! is reversed and each of its bases faces the base at the same index of the
//! second strand. Scoring is a pure function of that alignment and the
//! injected [`NnParams`].

use serde::{Deserialize, Serialize};

use super::bases::complement_byte;
use super::dimer::Dimer;
use super::error::{Result, ThermoError};
use super::hairpin::Hairpin;
use super::nn_params::{NnParams, DEFAULT_NN_PARAMS};

/// Below this magnitude (kcal/mol/K) the aggregate entropy counts as zero.
pub const MIN_TOTAL_ENTROPY: f64 = 1e-9;

/// Thermodynamic summary of one structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thermodynamics {
    /// Matches minus mismatches over the compared stem positions
    pub score: i32,
    /// Number of compared stem positions
    pub stem_len: usize,
    /// Number of compared positions that form a Watson-Crick pair
    pub matched: usize,
    /// Gibbs free energy (kcal/mol)
    pub delta_g: f64,
    /// Stem enthalpy (kcal/mol)
    pub delta_h: f64,
    /// Stem entropy (kcal/mol/K)
    pub delta_s: f64,
    /// Temperature (K) at which `delta_g` holds
    pub reference_temperature: f64,
}

impl Thermodynamics {
    /// Entropy of everything the table only knows as free energy (loop,
    /// mismatches, end corrections), backed out of `ΔG = ΔH - TΔS` at the
    /// reference temperature.
    pub fn loop_entropy(&self) -> f64 {
        (self.delta_h - self.delta_g) / self.reference_temperature - self.delta_s
    }

    pub fn total_entropy(&self) -> f64 {
        self.delta_s + self.loop_entropy()
    }

    /// Melting temperature in Kelvin: `ΔH / (ΔS + ΔS_loop)`.
    ///
    /// Undefined when nothing pairs, when the entropy is (near) zero or not
    /// finite, and when the quotient itself is not finite.
    pub fn melting_temperature(&self) -> Result<f64> {
        let entropy = self.total_entropy();
        if self.matched == 0 || !entropy.is_finite() || entropy.abs() < MIN_TOTAL_ENTROPY {
            return Err(ThermoError::UndefinedMeltingTemperature { entropy });
        }
        let tm = self.delta_h / entropy;
        if !tm.is_finite() {
            return Err(ThermoError::UndefinedMeltingTemperature { entropy });
        }
        Ok(tm)
    }
}

/// Stem of a structure in reverse-complement alignment.
struct StemAlignment {
    top: Vec<u8>,
    bottom: Vec<u8>,
    matches: Vec<bool>,
}

impl StemAlignment {
    /// Align `reverse(first)` against `second` over their common length.
    fn new(first: &str, second: &str) -> Result<Self> {
        let len = first.len().min(second.len());
        if len == 0 {
            return Err(ThermoError::StructureTooShort);
        }
        let top: Vec<u8> = first.bytes().rev().take(len).collect();
        let bottom: Vec<u8> = second.bytes().take(len).collect();
        let matches = top
            .iter()
            .zip(&bottom)
            .enumerate()
            .map(|(i, (&t, &b))| complement_byte(t, i).map(|c| c == b))
            .collect::<Result<Vec<bool>>>()?;
        Ok(Self {
            top,
            bottom,
            matches,
        })
    }

    fn len(&self) -> usize {
        self.matches.len()
    }

    fn matched(&self) -> usize {
        self.matches.iter().filter(|&&m| m).count()
    }

    fn score(&self) -> i32 {
        self.matches.iter().map(|&m| if m { 1 } else { -1 }).sum()
    }

    fn mismatch_dg(&self, params: &NnParams) -> f64 {
        (self.len() - self.matched()) as f64 * params.mismatch_penalty
    }

    /// Sum ΔG/ΔH/ΔS over steps whose both positions pair.
    fn stacked_steps(&self, params: &NnParams) -> Result<(f64, f64, f64)> {
        let (mut dg, mut dh, mut ds) = (0.0, 0.0, 0.0);
        for i in 0..self.len() - 1 {
            if !(self.matches[i] && self.matches[i + 1]) {
                continue;
            }
            let step = params.duplex_step(
                [self.top[i], self.top[i + 1]],
                [self.bottom[i], self.bottom[i + 1]],
            )?;
            dg += step.dg;
            dh += step.dh;
            ds += step.ds;
        }
        Ok((dg, dh, ds))
    }

    /// Positions of the two stem ends (a single one for a 1-base stem).
    fn ends(&self) -> impl Iterator<Item = usize> {
        let last = self.len() - 1;
        std::iter::once(0).chain((last > 0).then_some(last))
    }

    /// Enthalpy and entropy corrections of the matched stem ends.
    fn end_dh_ds(&self, params: &NnParams) -> Result<(f64, f64)> {
        self.ends()
            .filter(|&i| self.matches[i])
            .try_fold((0.0, 0.0), |(dh, ds), i| {
                Ok((
                    dh + params.end_dh.for_base(self.top[i], i)?,
                    ds + params.end_ds.for_base(self.top[i], i)?,
                ))
            })
    }
}

/// Scores structures against one parameter set.
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    params: &'a NnParams,
}

impl Default for Scorer<'static> {
    fn default() -> Self {
        Self {
            params: &DEFAULT_NN_PARAMS,
        }
    }
}

impl<'a> Scorer<'a> {
    /// Wrap a parameter set as is. The set is not validated; a missing step
    /// surfaces as `MissingParameter` while scoring. Use [`Scorer::validated`]
    /// for sets that did not come through [`NnParams::from_json`].
    pub fn new(params: &'a NnParams) -> Self {
        Self { params }
    }

    /// Wrap a parameter set after checking it is complete and usable.
    pub fn validated(params: &'a NnParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &'a NnParams {
        self.params
    }

    /// Matches minus mismatches between the hairpin stems.
    pub fn hairpin_score(&self, hairpin: &Hairpin) -> Result<i32> {
        Ok(StemAlignment::new(hairpin.stem1(), hairpin.stem2())?.score())
    }

    /// Matches minus mismatches across the dimer overlap.
    pub fn dimer_score(&self, dimer: &Dimer) -> Result<i32> {
        Ok(StemAlignment::new(dimer.window1(), dimer.window2())?.score())
    }

    /// Free energy of the loop, including the closing base of each stem.
    pub fn hairpin_loop_dg(&self, hairpin: &Hairpin) -> Result<f64> {
        let (stem1, stem2) = (hairpin.stem1().as_bytes(), hairpin.stem2().as_bytes());
        let (Some(&first), Some(&last)) = (stem1.last(), stem2.first()) else {
            return Err(ThermoError::StructureTooShort);
        };
        let mut closed = Vec::with_capacity(hairpin.loop_seq().len() + 2);
        closed.push(first);
        closed.extend_from_slice(hairpin.loop_seq().as_bytes());
        closed.push(last);

        closed
            .windows(2)
            .map(|w| self.params.loop_step([w[0], w[1]]))
            .sum()
    }

    /// Full thermodynamic estimate of a hairpin.
    pub fn score_hairpin(&self, hairpin: &Hairpin) -> Result<Thermodynamics> {
        let params = self.params;
        let stem = StemAlignment::new(hairpin.stem1(), hairpin.stem2())?;
        let (stack_dg, stack_dh, stack_ds) = stem.stacked_steps(params)?;
        let loop_dg = self.hairpin_loop_dg(hairpin)?;

        // innermost pair closes the loop
        let closing_dg = if stem.matches[0] {
            params.hairpin_end_dg.for_base(stem.top[0], 0)?
        } else {
            params.mismatch_penalty
        };

        let (end_dh, end_ds) = stem.end_dh_ds(params)?;
        let thermo = Thermodynamics {
            score: stem.score(),
            stem_len: stem.len(),
            matched: stem.matched(),
            delta_g: stack_dg + loop_dg + stem.mismatch_dg(params) + closing_dg,
            delta_h: stack_dh + end_dh,
            delta_s: stack_ds + end_ds,
            reference_temperature: params.reference_temperature,
        };
        log::trace!("hairpin {:?}: {:?}", hairpin, thermo);
        Ok(thermo)
    }

    /// Full thermodynamic estimate of a dimer overlap.
    pub fn score_dimer(&self, dimer: &Dimer) -> Result<Thermodynamics> {
        let params = self.params;
        let stem = StemAlignment::new(dimer.window1(), dimer.window2())?;
        let (stack_dg, stack_dh, stack_ds) = stem.stacked_steps(params)?;

        let init_dg: f64 = stem
            .ends()
            .map(|i| {
                if stem.matches[i] {
                    params.duplex_init_dg.for_base(stem.top[i], i)
                } else {
                    Ok(params.mismatch_penalty)
                }
            })
            .sum::<Result<f64>>()?;
        let symmetry_dg = if dimer.is_symmetric() {
            params.symmetry_dg
        } else {
            0.0
        };

        let (end_dh, end_ds) = stem.end_dh_ds(params)?;
        let thermo = Thermodynamics {
            score: stem.score(),
            stem_len: stem.len(),
            matched: stem.matched(),
            delta_g: stack_dg + stem.mismatch_dg(params) + init_dg + symmetry_dg,
            delta_h: stack_dh + end_dh,
            delta_s: stack_ds + end_ds,
            reference_temperature: params.reference_temperature,
        };
        log::trace!("dimer {:?}: {:?}", dimer, thermo);
        Ok(thermo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn zeroed_params() -> NnParams {
        let mut params = NnParams::default();
        for step in params.duplex.values_mut() {
            step.dg = 0.0;
            step.dh = 0.0;
            step.ds = 0.0;
        }
        for dg in params.loop_steps.values_mut() {
            *dg = 0.0;
        }
        for ends in [
            &mut params.hairpin_end_dg,
            &mut params.duplex_init_dg,
            &mut params.end_dh,
            &mut params.end_ds,
        ] {
            ends.gc = 0.0;
            ends.at = 0.0;
        }
        params.mismatch_penalty = 0.0;
        params
    }

    #[test]
    fn test_fully_paired_hairpin() {
        let hairpin = Hairpin::new("GC", "AAAA", "GC").unwrap();
        let thermo = Scorer::default().score_hairpin(&hairpin).unwrap();

        assert_eq!(thermo.score, 2);
        assert_eq!(thermo.matched, 2);
        // CG/GC step + CAAAAG loop + G·C closing pair
        assert_relative_eq!(thermo.delta_g, -2.17 + 7.0 - 2.182, epsilon = 1e-12);
        assert_relative_eq!(thermo.delta_h, -10.6 + 0.1 + 0.1, epsilon = 1e-12);
        assert_relative_eq!(thermo.delta_s, -0.0272 - 0.0028 * 2.0, epsilon = 1e-12);

        let tm = thermo.melting_temperature().unwrap();
        let expected = thermo.delta_h * 310.0 / (thermo.delta_h - thermo.delta_g);
        assert_relative_eq!(tm, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_loop_entropy_balances_free_energy() {
        let hairpin = Hairpin::new("GGAC", "TTTTT", "GTCC").unwrap();
        let thermo = Scorer::default().score_hairpin(&hairpin).unwrap();
        let t = thermo.reference_temperature;
        assert_relative_eq!(
            thermo.total_entropy(),
            (thermo.delta_h - thermo.delta_g) / t,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            thermo.delta_h - t * thermo.total_entropy(),
            thermo.delta_g,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_fully_mismatched_hairpin() {
        let hairpin = Hairpin::new("AA", "AAAA", "AA").unwrap();
        let scorer = Scorer::default();
        assert_eq!(scorer.hairpin_score(&hairpin).unwrap(), -2);

        let thermo = scorer.score_hairpin(&hairpin).unwrap();
        // loop of six A's, two mismatches, mismatched closing pair
        assert_relative_eq!(thermo.delta_g, 7.0 + 3.0 * 0.438, epsilon = 1e-12);
        assert_eq!(thermo.delta_h, 0.0);
        assert_eq!(thermo.delta_s, 0.0);
        assert!(matches!(
            thermo.melting_temperature(),
            Err(ThermoError::UndefinedMeltingTemperature { .. })
        ));
    }

    #[test]
    fn test_step_needs_both_flanks_paired() {
        // reversed stem1 ACG against TAC: middle position mismatches
        let hairpin = Hairpin::new("GCA", "TTTT", "TAC").unwrap();
        let thermo = Scorer::default().score_hairpin(&hairpin).unwrap();

        assert_eq!(thermo.score, 1);
        assert_relative_eq!(thermo.delta_g, 0.438 + 5.5 - 1.653, epsilon = 1e-12);
        assert_relative_eq!(thermo.delta_h, 2.3 + 0.1, epsilon = 1e-12);
        assert_relative_eq!(thermo.delta_s, 0.0041 - 0.0028, epsilon = 1e-12);
    }

    #[test]
    fn test_unequal_stems_use_shortest() {
        let hairpin = Hairpin::new("TTGC", "AAAA", "GC").unwrap();
        let scorer = Scorer::default();
        assert_eq!(hairpin.min_stem_len(), 2);
        assert_eq!(scorer.hairpin_score(&hairpin).unwrap(), 2);
        let short = Hairpin::new("GC", "AAAA", "GC").unwrap();
        assert_eq!(
            scorer.score_hairpin(&hairpin).unwrap().delta_h,
            scorer.score_hairpin(&short).unwrap().delta_h
        );
    }

    #[test]
    fn test_empty_stem_cannot_be_scored() {
        let hairpin = Hairpin::new("GC", "AAAA", "").unwrap();
        let scorer = Scorer::default();
        assert_eq!(scorer.score_hairpin(&hairpin), Err(ThermoError::StructureTooShort));
        assert_eq!(scorer.hairpin_score(&hairpin), Err(ThermoError::StructureTooShort));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let hairpin = Hairpin::new("ATGCC", "TAGAT", "GGCAT").unwrap();
        let scorer = Scorer::default();
        let a = scorer.score_hairpin(&hairpin).unwrap();
        let b = scorer.score_hairpin(&hairpin).unwrap();
        assert_eq!(a.delta_g.to_bits(), b.delta_g.to_bits());
        assert_eq!(a.delta_h.to_bits(), b.delta_h.to_bits());
        assert_eq!(a.delta_s.to_bits(), b.delta_s.to_bits());
        assert_eq!(
            a.melting_temperature().unwrap().to_bits(),
            b.melting_temperature().unwrap().to_bits()
        );
    }

    #[test]
    fn test_swapped_parameter_set() {
        let hairpin = Hairpin::new("AA", "AAAA", "AA").unwrap();
        let mut params = NnParams::default();
        params.mismatch_penalty = 1.0;
        let custom = Scorer::new(&params).score_hairpin(&hairpin).unwrap();
        let stock = Scorer::default().score_hairpin(&hairpin).unwrap();
        assert_relative_eq!(custom.delta_g - stock.delta_g, 3.0 * (1.0 - 0.438), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_entropy_is_undefined() {
        let params = zeroed_params();
        let hairpin = Hairpin::new("GC", "AAAA", "GC").unwrap();
        let thermo = Scorer::new(&params).score_hairpin(&hairpin).unwrap();
        assert_eq!(thermo.delta_g, 0.0);
        assert_eq!(
            thermo.melting_temperature(),
            Err(ThermoError::UndefinedMeltingTemperature { entropy: 0.0 })
        );
    }

    #[test]
    fn test_entropy_threshold() {
        let mut params = zeroed_params();
        params.end_dh.gc = 1.0;
        // ends contribute ΔH = 2 while ΔG stays 0, so Tm lands on the reference
        let hairpin = Hairpin::new("GC", "AAAA", "GC").unwrap();
        let thermo = Scorer::new(&params).score_hairpin(&hairpin).unwrap();
        let tm = thermo.melting_temperature().unwrap();
        assert_relative_eq!(tm, 310.0, epsilon = 1e-9);

        let tiny = Thermodynamics {
            delta_h: 2e-9 * 310.0,
            ..thermo
        };
        assert!(tiny.total_entropy().abs() >= MIN_TOTAL_ENTROPY);
        assert!(tiny.melting_temperature().is_ok());
        let degenerate = Thermodynamics {
            delta_h: 1e-10 * 310.0,
            ..thermo
        };
        assert!(degenerate.melting_temperature().is_err());
    }

    #[test]
    fn test_zero_reference_temperature_is_undefined() {
        let mut params = NnParams::default();
        params.reference_temperature = 0.0;
        let hairpin = Hairpin::new("GC", "AAAA", "GC").unwrap();
        let thermo = Scorer::new(&params).score_hairpin(&hairpin).unwrap();
        assert!(!thermo.total_entropy().is_finite());
        assert!(matches!(
            thermo.melting_temperature(),
            Err(ThermoError::UndefinedMeltingTemperature { .. })
        ));

        // ΔH == ΔG at T = 0 gives 0/0
        let nan = Thermodynamics {
            delta_h: thermo.delta_g,
            ..thermo
        };
        assert!(nan.total_entropy().is_nan());
        assert!(nan.melting_temperature().is_err());

        assert!(matches!(
            Scorer::validated(&params),
            Err(ThermoError::InvalidParameters(_))
        ));
        assert!(Scorer::validated(&DEFAULT_NN_PARAMS).is_ok());
    }

    #[test]
    fn test_loop_free_energy() {
        let hairpin = Hairpin::new("GC", "AAAA", "GC").unwrap();
        assert_relative_eq!(
            Scorer::default().hairpin_loop_dg(&hairpin).unwrap(),
            0.4 + 3.0 * 1.4 + 2.4,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_palindromic_dimer() {
        let dimer = Dimer::new("ACGT", "ACGT", 0, 3, 0, 3).unwrap();
        let thermo = Scorer::default().score_dimer(&dimer).unwrap();

        assert_eq!(thermo.score, 4);
        // TG/AC + GC/CG + CA/GT, two A·T initiations, symmetry
        assert_relative_eq!(
            thermo.delta_g,
            -1.45 - 2.24 - 1.45 + 2.0 * 1.03 + 0.43,
            epsilon = 1e-12
        );
        assert_relative_eq!(thermo.delta_h, -8.5 - 9.8 - 8.5 + 2.0 * 2.3, epsilon = 1e-12);
        assert_relative_eq!(
            thermo.delta_s,
            (-22.7 - 24.4 - 22.7) / 1000.0 + 2.0 * 0.0041,
            epsilon = 1e-12
        );
        assert!(thermo.melting_temperature().is_ok());
    }

    #[test]
    fn test_mismatched_dimer() {
        let dimer = Dimer::new("AAAA", "AAAA", 0, 3, 0, 3).unwrap();
        let scorer = Scorer::default();
        assert_eq!(scorer.dimer_score(&dimer).unwrap(), -4);
        let thermo = scorer.score_dimer(&dimer).unwrap();
        assert_relative_eq!(thermo.delta_g, 6.0 * 0.438, epsilon = 1e-12);
    }

    #[test]
    fn test_single_base_dimer_counts_one_end() {
        let dimer = Dimer::new("ACGT", "ACGT", 3, 3, 0, 0).unwrap();
        let thermo = Scorer::default().score_dimer(&dimer).unwrap();
        assert_eq!(thermo.score, 1);
        assert_relative_eq!(thermo.delta_g, 1.03, epsilon = 1e-12);
        assert_relative_eq!(thermo.delta_h, 2.3, epsilon = 1e-12);
    }
}
