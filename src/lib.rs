//! Oligoscreen Structure - Primer Secondary-Structure Screening
//!
//! Predicts hairpins and self/cross dimers a PCR primer can form, estimates
//! their stability with a nearest-neighbor model, and scores sequence
//! repetitiveness through linguistic complexity.
//!
//! ```
//! use oligoscreen_structure::{linguistic_complexity, screen_hairpins, ScreenParams, Scorer};
//!
//! let results = screen_hairpins("GGATCCTTTTGGATCC", &Scorer::default(), &ScreenParams::default()).unwrap();
//! let best = results.best().unwrap();
//! assert!(best.thermo.delta_g < 0.0);
//!
//! assert_eq!(linguistic_complexity("ACGT").unwrap(), 1.0);
//! ```

pub mod analysis;

pub use analysis::*;
