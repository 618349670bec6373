//! Nearest-neighbor (NN) parameter set.
//!
//! The scorer never hard-codes energies: it queries an [`NnParams`] value that
//! is either the built-in set ([`DEFAULT_NN_PARAMS`]) or one loaded from JSON,
//! e.g. a set measured under different salt conditions.
//!
//! Units: free energy and enthalpy in kcal/mol, entropy in kcal/(mol·K),
//! temperature in Kelvin.
//!
//! # REFERENCES
//!  - Duplex ΔH/ΔS: SantaLucia & Hicks (2004), Annu Rev Biophys Biomol Struct 33: 415-440
//!  - Terminal ΔH/ΔS: SantaLucia (1998), Proc Natl Acad Sci USA 95: 1460-1465

use std::collections::HashMap;
use std::io::Read;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::bases::{complement_byte, STANDARD_BASES};
use super::error::{Result, ThermoError};

/// Process-wide, read-only default parameter set.
pub static DEFAULT_NN_PARAMS: Lazy<NnParams> = Lazy::new(NnParams::default);

/// Contribution of one stacked base-pair step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NnStep {
    /// Free energy (kcal/mol)
    pub dg: f64,
    /// Enthalpy (kcal/mol)
    pub dh: f64,
    /// Entropy (kcal/mol/K)
    pub ds: f64,
}

/// A constant that depends on whether a terminal pair is G·C or A·T.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndCorrection {
    pub gc: f64,
    pub at: f64,
}

impl EndCorrection {
    /// Pick the G·C or A·T value for a (matched) pair whose top base is `base`.
    ///
    /// `position` is reported back in the error for anything but ACGT.
    pub fn for_base(&self, base: u8, position: usize) -> Result<f64> {
        match base {
            b'G' | b'C' => Ok(self.gc),
            b'A' | b'T' => Ok(self.at),
            other => Err(ThermoError::InvalidBase {
                base: other as char,
                position,
            }),
        }
    }
}

/// Complete NN parameter set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NnParams {
    /// Stacked pair steps keyed `XY/X'Y'` (top 5'->3' / bottom 3'->5').
    pub duplex: HashMap<String, NnStep>,
    /// Free energy of consecutive unpaired bases in a hairpin loop, keyed `XY`.
    pub loop_steps: HashMap<String, f64>,
    /// Free energy correction for the innermost pair of a hairpin stem.
    pub hairpin_end_dg: EndCorrection,
    /// Free energy initiation for each end of a dimer duplex.
    pub duplex_init_dg: EndCorrection,
    /// Enthalpy correction per matched terminal pair.
    pub end_dh: EndCorrection,
    /// Entropy correction per matched terminal pair.
    pub end_ds: EndCorrection,
    /// Free energy correction for a self-complementary duplex.
    pub symmetry_dg: f64,
    /// Free energy penalty per mismatched position.
    pub mismatch_penalty: f64,
    /// Temperature (K) at which the free energies are tabulated.
    pub reference_temperature: f64,
}

/// (key, ΔG, ΔH, ΔS in cal/mol/K)
static RAW_DUPLEX: [(&str, f64, f64, f64); 16] = [
    ("AA/TT", -1.00, -7.6, -21.3),
    ("TT/AA", -1.00, -7.6, -21.3),
    ("AT/TA", -0.88, -7.2, -20.4),
    ("TA/AT", -0.58, -7.2, -21.3),
    ("CA/GT", -1.45, -8.5, -22.7),
    ("TG/AC", -1.45, -8.5, -22.7),
    ("GT/CA", -1.44, -8.4, -22.4),
    ("AC/TG", -1.44, -8.4, -22.4),
    ("CT/GA", -1.28, -7.8, -21.0),
    ("AG/TC", -1.28, -7.8, -21.0),
    ("GA/CT", -1.30, -8.2, -22.2),
    ("TC/AG", -1.30, -8.2, -22.2),
    ("CG/GC", -2.17, -10.6, -27.2),
    ("GC/CG", -2.24, -9.8, -24.4),
    ("GG/CC", -1.84, -8.0, -19.9),
    ("CC/GG", -1.84, -8.0, -19.9),
];

static RAW_LOOP: [(&str, f64); 16] = [
    ("AA", 1.4),
    ("TA", 1.2),
    ("GA", 0.1),
    ("CA", 0.4),
    ("AT", 1.5),
    ("TT", 1.0),
    ("GT", 0.9),
    ("CT", 0.2),
    ("AG", 2.4),
    ("TG", 1.7),
    ("GG", 1.2),
    ("CG", 0.0),
    ("AC", 2.4),
    ("TC", 1.9),
    ("GC", 1.5),
    ("CC", 1.0),
];

impl Default for NnParams {
    fn default() -> Self {
        let duplex = RAW_DUPLEX
            .iter()
            .map(|&(key, dg, dh, ds)| {
                (
                    key.to_string(),
                    NnStep {
                        dg,
                        dh,
                        ds: ds / 1000.0,
                    },
                )
            })
            .collect();
        let loop_steps = RAW_LOOP
            .iter()
            .map(|&(key, dg)| (key.to_string(), dg))
            .collect();

        Self {
            duplex,
            loop_steps,
            hairpin_end_dg: EndCorrection {
                gc: -2.182,
                at: -1.653,
            },
            duplex_init_dg: EndCorrection { gc: 0.98, at: 1.03 },
            end_dh: EndCorrection { gc: 0.1, at: 2.3 },
            end_ds: EndCorrection {
                gc: -2.8 / 1000.0,
                at: 4.1 / 1000.0,
            },
            symmetry_dg: 0.43,
            mismatch_penalty: 0.438,
            reference_temperature: 310.0,
        }
    }
}

/// Build the `XY/X'Y'` lookup key of a stacked pair step.
pub fn duplex_key(top: [u8; 2], bottom: [u8; 2]) -> String {
    let mut key = String::with_capacity(5);
    key.push(top[0] as char);
    key.push(top[1] as char);
    key.push('/');
    key.push(bottom[0] as char);
    key.push(bottom[1] as char);
    key
}

impl NnParams {
    /// Load a parameter set from JSON text and check it is complete.
    pub fn from_json(text: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }

    /// Load a parameter set from any reader (file, buffer) and check it is complete.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let params: Self = serde_json::from_reader(reader)?;
        params.validate()?;
        Ok(params)
    }

    /// Serialize the parameter set as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Every Watson-Crick step and every loop 2-mer over ACGT must be present.
    pub fn validate(&self) -> Result<()> {
        for x in STANDARD_BASES {
            for y in STANDARD_BASES {
                let (x, y) = (x as u8, y as u8);
                let bottom = [complement_byte(x, 0)?, complement_byte(y, 1)?];
                let key = duplex_key([x, y], bottom);
                if !self.duplex.contains_key(&key) {
                    return Err(ThermoError::MissingParameter(key));
                }
                let loop_key: String = [x as char, y as char].iter().collect();
                if !self.loop_steps.contains_key(&loop_key) {
                    return Err(ThermoError::MissingParameter(loop_key));
                }
            }
        }
        if !(self.reference_temperature > 0.0 && self.reference_temperature.is_finite()) {
            return Err(ThermoError::InvalidParameters(format!(
                "reference temperature must be positive, got {}",
                self.reference_temperature
            )));
        }
        Ok(())
    }

    /// Look up a stacked pair step.
    pub fn duplex_step(&self, top: [u8; 2], bottom: [u8; 2]) -> Result<&NnStep> {
        let key = duplex_key(top, bottom);
        self.duplex
            .get(&key)
            .ok_or(ThermoError::MissingParameter(key))
    }

    /// Look up the free energy of two consecutive loop bases.
    pub fn loop_step(&self, pair: [u8; 2]) -> Result<f64> {
        let key: String = [pair[0] as char, pair[1] as char].iter().collect();
        self.loop_steps
            .get(&key)
            .copied()
            .ok_or(ThermoError::MissingParameter(key))
    }
}
