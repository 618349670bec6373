//! Structure screening
//!
//! Enumerates candidate hairpins or dimers, scores them in parallel, keeps
//! the ones passing the filters and ranks them from most to least stable.

use rayon::prelude::*;

use super::dimer::{enumerate_dimers, Dimer};
use super::error::{Result, ThermoError};
use super::hairpin::{enumerate_hairpins, Hairpin};
use super::thermo::{Scorer, Thermodynamics};
use super::types::{ScoredStructure, ScreenParams, ScreenResults, ThreadCount};

/// Screen every hairpin candidate of `seq`.
pub fn screen_hairpins(
    seq: &str,
    scorer: &Scorer<'_>,
    params: &ScreenParams,
) -> Result<ScreenResults<Hairpin>> {
    let candidates = enumerate_hairpins(seq)?;
    run_screening(candidates, params, |h| scorer.score_hairpin(h))
}

/// Screen every dimer register of `seq1` against `seq2`.
///
/// Pass the same sequence twice to look for self-dimers.
pub fn screen_dimers(
    seq1: &str,
    seq2: &str,
    scorer: &Scorer<'_>,
    params: &ScreenParams,
) -> Result<ScreenResults<Dimer>> {
    let candidates = enumerate_dimers(seq1, seq2, params.min_dimer_overlap)?;
    run_screening(candidates, params, |d| scorer.score_dimer(d))
}

/// Score candidates on a dedicated pool, filter, and rank by free energy
fn run_screening<S, F>(
    candidates: Vec<S>,
    params: &ScreenParams,
    score: F,
) -> Result<ScreenResults<S>>
where
    S: Send,
    F: Fn(&S) -> Result<Thermodynamics> + Sync,
{
    let candidates_total = candidates.len();
    let pool = build_pool(params.thread_count)?;

    let scored: Vec<ScoredStructure<S>> = pool.install(|| {
        candidates
            .into_par_iter()
            .enumerate()
            .map(|(index, candidate)| {
                score(&candidate).map(|thermo| ScoredStructure::new(index, candidate, thermo))
            })
            .collect::<Result<Vec<_>>>()
    })?;

    let mut hits: Vec<ScoredStructure<S>> = scored
        .into_iter()
        .filter(|s| params.accepts(&s.thermo))
        .collect();

    // Parallel scoring may finish out of order; ties keep enumeration order
    hits.sort_by(|a, b| {
        a.thermo
            .delta_g
            .total_cmp(&b.thermo.delta_g)
            .then(a.index.cmp(&b.index))
    });

    log::debug!(
        "screened {} candidates, {} accepted",
        candidates_total,
        hits.len()
    );

    Ok(ScreenResults {
        params: params.clone(),
        candidates_total,
        hits,
    })
}

/// Build a rayon pool sized by the configured thread count
fn build_pool(thread_count: ThreadCount) -> Result<rayon::ThreadPool> {
    let num_threads = thread_count.get_count();
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .or_else(|_| {
            // Fallback to default pool if custom pool fails
            rayon::ThreadPoolBuilder::new().build()
        })
        .map_err(|e| ThermoError::InvalidParameters(format!("thread pool: {}", e)))
}
