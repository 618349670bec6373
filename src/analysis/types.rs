//! Data types for structure screening

use serde::{Deserialize, Serialize};

use super::hairpin::MIN_STEM_LEN;
use super::thermo::Thermodynamics;

/// Thread count configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadCount {
    /// Use all available CPU cores
    Auto,
    /// Use a specific number of threads
    Fixed(usize),
}

impl Default for ThreadCount {
    fn default() -> Self {
        Self::Auto
    }
}

impl ThreadCount {
    /// Get the actual number of threads to use
    pub fn get_count(&self) -> usize {
        match self {
            Self::Auto => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            Self::Fixed(n) => (*n).max(1),
        }
    }
}

/// Screening filters and execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenParams {
    /// Drop candidates whose match score is below this value
    pub min_score: Option<i32>,
    /// Drop candidates whose free energy (kcal/mol) is above this value
    pub max_delta_g: Option<f64>,
    /// Shortest overlap considered when enumerating dimers
    pub min_dimer_overlap: usize,
    pub thread_count: ThreadCount,
}

impl Default for ScreenParams {
    fn default() -> Self {
        Self {
            min_score: None,
            max_delta_g: None,
            min_dimer_overlap: MIN_STEM_LEN,
            thread_count: ThreadCount::Auto,
        }
    }
}

impl ScreenParams {
    /// Whether a scored candidate passes the filters
    pub fn accepts(&self, thermo: &Thermodynamics) -> bool {
        self.min_score.map_or(true, |min| thermo.score >= min)
            && self.max_delta_g.map_or(true, |max| thermo.delta_g <= max)
    }
}

/// One candidate structure with its thermodynamic estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredStructure<S> {
    /// Position of the candidate in enumeration order
    pub index: usize,
    pub structure: S,
    pub thermo: Thermodynamics,
    /// Kelvin; `None` when the melting temperature is undefined
    pub melting_temperature: Option<f64>,
}

impl<S> ScoredStructure<S> {
    pub fn new(index: usize, structure: S, thermo: Thermodynamics) -> Self {
        let melting_temperature = match thermo.melting_temperature() {
            Ok(tm) => Some(tm),
            Err(err) => {
                log::debug!("candidate {}: {}", index, err);
                None
            }
        };
        Self {
            index,
            structure,
            thermo,
            melting_temperature,
        }
    }
}

/// Complete screening results for one sequence (or sequence pair)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenResults<S> {
    pub params: ScreenParams,
    /// Number of candidates enumerated before filtering
    pub candidates_total: usize,
    /// Accepted candidates, most stable (lowest ΔG) first
    pub hits: Vec<ScoredStructure<S>>,
}

impl<S> ScreenResults<S> {
    /// Most stable accepted candidate
    pub fn best(&self) -> Option<&ScoredStructure<S>> {
        self.hits.first()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thermo(score: i32, delta_g: f64) -> Thermodynamics {
        Thermodynamics {
            score,
            stem_len: 4,
            matched: 4,
            delta_g,
            delta_h: -20.0,
            delta_s: -0.05,
            reference_temperature: 310.0,
        }
    }

    #[test]
    fn test_default_accepts_everything() {
        let params = ScreenParams::default();
        assert!(params.accepts(&thermo(-4, 10.0)));
        assert_eq!(params.min_dimer_overlap, 2);
    }

    #[test]
    fn test_filters() {
        let params = ScreenParams {
            min_score: Some(2),
            max_delta_g: Some(0.0),
            ..Default::default()
        };
        assert!(params.accepts(&thermo(2, -1.0)));
        assert!(!params.accepts(&thermo(1, -1.0)));
        assert!(!params.accepts(&thermo(3, 0.5)));
    }

    #[test]
    fn test_thread_count() {
        assert_eq!(ThreadCount::Fixed(3).get_count(), 3);
        assert_eq!(ThreadCount::Fixed(0).get_count(), 1);
        assert!(ThreadCount::Auto.get_count() >= 1);
    }

    #[test]
    fn test_params_from_json() {
        let params: ScreenParams = serde_json::from_str(
            r#"{"min_score":1,"max_delta_g":null,"min_dimer_overlap":3,"thread_count":{"Fixed":2}}"#,
        )
        .unwrap();
        assert_eq!(params.min_score, Some(1));
        assert_eq!(params.thread_count, ThreadCount::Fixed(2));
    }
}
