use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

use crate::input::LoadedFile;
use crate::pipeline::stage2_evaluate::TrialRecord;

/// Exact median: mean of the two middle order statistics for even n.
/// None for an empty sample set.
pub fn median(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some(0.5 * (sorted[n / 2 - 1] + sorted[n / 2]))
    }
}

/// Fraction of samples strictly greater than zero. A sign-stability signal
/// independent of the resampling machinery.
pub fn frac_pos(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let count = samples.iter().filter(|&&v| v > 0.0).count();
    count as f64 / samples.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootstrapInterval {
    pub median: f64,
    pub lo: f64,
    pub hi: f64,
}

/// Percentile bootstrap for the median: `reps` resamples with replacement,
/// each the size of the input; the interval is the 2.5th/97.5th percentile
/// of the sorted resample medians. A single-sample input collapses to that
/// value regardless of `reps`.
pub fn bootstrap_median(
    samples: &[f64],
    reps: usize,
    rng: &mut StdRng,
) -> Option<BootstrapInterval> {
    let med = median(samples)?;
    if reps == 0 {
        return Some(BootstrapInterval {
            median: med,
            lo: med,
            hi: med,
        });
    }

    let n = samples.len();
    let mut resample = vec![0.0f64; n];
    let mut meds = Vec::with_capacity(reps);
    for _ in 0..reps {
        for slot in resample.iter_mut() {
            *slot = samples[rng.gen_range(0..n)];
        }
        meds.push(median(&resample).unwrap_or(med));
    }
    meds.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = reps - 1;
    let lo_idx = ((0.025 * reps as f64) as usize).min(last);
    let hi_idx = ((0.975 * reps as f64) as usize).min(last);
    Some(BootstrapInterval {
        median: med,
        lo: meds[lo_idx],
        hi: meds[hi_idx],
    })
}

#[derive(Debug, Clone)]
pub struct FileSummary {
    pub file: String,
    pub r: f64,
    pub y: f64,
    pub n: usize,
    pub median: f64,
    pub lo: f64,
    pub hi: f64,
    pub frac_pos: f64,
}

#[derive(Debug, Clone)]
pub struct GroupSummary {
    pub r: f64,
    pub n: usize,
    pub median: f64,
    pub lo: f64,
    pub hi: f64,
    pub frac_pos: f64,
}

#[derive(Debug)]
pub struct Stage4Output {
    /// One row per usable file, ordered by (R, file name).
    pub by_file: Vec<FileSummary>,
    /// One row per spectral-parameter group, ordered by R.
    pub by_r: Vec<GroupSummary>,
}

/// Aggregate derivative samples at two granularities: per file (that file's
/// sweep trials) and per spectral parameter R (raw samples pooled across
/// every file sharing the R token, never medians of medians).
///
/// Grouping compares the literal R token from the file name; a file whose
/// R failed to parse forms its own singleton group rather than merging
/// with other unparsed files. A single seeded RNG is threaded through both
/// passes in deterministic order, so repeated runs produce byte-identical
/// summaries.
pub fn run_stage4(
    files: &[LoadedFile],
    trials: &[Vec<TrialRecord>],
    reps: usize,
    seed: u64,
) -> Stage4Output {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut by_file = Vec::with_capacity(files.len());
    let mut groups: BTreeMap<String, (f64, Vec<f64>)> = BTreeMap::new();

    for (file, records) in files.iter().zip(trials.iter()) {
        let samples: Vec<f64> = records.iter().map(|t| t.lprime).collect();
        let Some(interval) = bootstrap_median(&samples, reps, &mut rng) else {
            warn!("{}: no derivative samples; excluded from summaries", file.base);
            continue;
        };
        let r = file.meta.r.value_or_nan();
        by_file.push(FileSummary {
            file: file.base.clone(),
            r,
            y: file.meta.y.value_or_nan(),
            n: samples.len(),
            median: interval.median,
            lo: interval.lo,
            hi: interval.hi,
            frac_pos: frac_pos(&samples),
        });

        let key = match file.meta.r.token() {
            Some(token) => format!("R:{token}"),
            None => format!("file:{}", file.base),
        };
        let (_, pooled) = groups.entry(key).or_insert_with(|| (r, Vec::new()));
        pooled.extend_from_slice(&samples);
    }

    by_file.sort_by(|a, b| {
        a.r.total_cmp(&b.r)
            .then_with(|| a.file.cmp(&b.file))
    });

    let mut by_r = Vec::with_capacity(groups.len());
    let mut ordered: Vec<(String, (f64, Vec<f64>))> = groups.into_iter().collect();
    ordered.sort_by(|a, b| (a.1).0.total_cmp(&(b.1).0).then_with(|| a.0.cmp(&b.0)));
    for (_, (r, samples)) in ordered {
        let Some(interval) = bootstrap_median(&samples, reps, &mut rng) else {
            continue;
        };
        by_r.push(GroupSummary {
            r,
            n: samples.len(),
            median: interval.median,
            lo: interval.lo,
            hi: interval.hi,
            frac_pos: frac_pos(&samples),
        });
    }

    info!(
        "aggregated {} file summary row(s) into {} R group(s)",
        by_file.len(),
        by_r.len()
    );

    Stage4Output { by_file, by_r }
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage4_aggregate.rs"]
mod tests;
