use rayon::prelude::*;
use tracing::info;

use crate::input::LoadedFile;
use crate::pipeline::EvalParams;
use crate::pipeline::stage2_evaluate::{SignTest, TrialRecord, run_sign_test, run_trial};

/// The stability grid. Every file is evaluated at every (delta, smooth)
/// pair, delta outermost, matching the order rows appear in the per-file
/// stability CSVs.
#[derive(Debug, Clone)]
pub struct SweepGrid {
    pub deltas: Vec<f64>,
    pub smooths: Vec<f64>,
}

impl SweepGrid {
    pub fn params(&self) -> Vec<EvalParams> {
        let mut out = Vec::with_capacity(self.deltas.len() * self.smooths.len());
        for &delta in &self.deltas {
            for &smooth in &self.smooths {
                out.push(EvalParams { delta, smooth });
            }
        }
        out
    }
}

#[derive(Debug)]
pub struct Stage3Output {
    /// Per-file trial records, indexed like the input file slice, each in
    /// grid order.
    pub trials: Vec<Vec<TrialRecord>>,
    /// Per-file supplemental diagnostics, same indexing.
    pub sign_tests: Vec<SignTest>,
}

/// Run every (file, grid point) trial. Trials are independent, so they run
/// on the rayon pool; `collect` preserves job order, so the merge back into
/// per-file lists is deterministic with no shared mutable state.
pub fn run_stage3(files: &[LoadedFile], grid: &SweepGrid) -> Stage3Output {
    let params = grid.params();
    info!(
        "stability sweep: {} file(s) x {} grid point(s)",
        files.len(),
        params.len()
    );

    let jobs: Vec<(usize, EvalParams)> = (0..files.len())
        .flat_map(|fi| params.iter().map(move |&p| (fi, p)))
        .collect();

    let records: Vec<(usize, TrialRecord)> = jobs
        .par_iter()
        .map(|&(fi, p)| (fi, run_trial(&files[fi], p)))
        .collect();

    let mut trials: Vec<Vec<TrialRecord>> = files
        .iter()
        .map(|_| Vec::with_capacity(params.len()))
        .collect();
    for (fi, record) in records {
        trials[fi].push(record);
    }

    let sign_tests: Vec<SignTest> = files.par_iter().map(run_sign_test).collect();

    Stage3Output { trials, sign_tests }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage3_sweep.rs"]
mod tests;
