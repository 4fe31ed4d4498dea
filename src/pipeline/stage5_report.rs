use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::input::LoadedFile;
use crate::pipeline::stage3_sweep::Stage3Output;
use crate::pipeline::stage4_aggregate::Stage4Output;
use crate::report::json::{RunSummary, render_run_summary};
use crate::report::plots::{PlotFormat, write_plots};
use crate::report::{format_e12, format_f64_3, format_f64_6, format_f64_12, format_num};

#[derive(Debug)]
pub struct Stage5Input<'a> {
    pub files: &'a [LoadedFile],
    pub sweep: &'a Stage3Output,
    pub summary: &'a Stage4Output,
    pub input_dir: String,
    pub deltas: &'a [f64],
    pub smooths: &'a [f64],
    pub boot: usize,
    pub seed: u64,
    pub outfmt: PlotFormat,
    pub dpi: u32,
}

/// Write the full output tree under `out_dir`:
///
///   stability/<base>.stab.csv       one row per (delta, smooth) trial
///   stability_summary_by_file.csv   per-file bootstrap summaries
///   stability_summary_by_R.csv      per-R pooled bootstrap summaries
///   sign_tests.csv                  prime sign sums + Hecke residuals
///   plots/*.png                     best effort, absence is non-fatal
///   run_summary.json                manifest of the run
///
/// Returns the artifact paths actually written.
pub fn write_outputs(input: &Stage5Input<'_>, out_dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let stability_dir = out_dir.join("stability");
    fs::create_dir_all(&stability_dir)?;

    let mut artifacts = Vec::new();

    for (file, records) in input.files.iter().zip(input.sweep.trials.iter()) {
        let stem = file.base.strip_suffix(".txt").unwrap_or(&file.base);
        let path = stability_dir.join(format!("{stem}.stab.csv"));
        let mut w = BufWriter::new(File::create(&path)?);
        writeln!(w, "delta,smooth,R,Y,M,L0,Lprime")?;
        for t in records {
            writeln!(
                w,
                "{},{},{},{},{},{},{}",
                format_num(t.delta),
                format_num(t.smooth),
                format_f64_12(t.r),
                format_f64_3(t.y),
                t.m,
                format_e12(t.l0),
                format_e12(t.lprime)
            )?;
        }
        artifacts.push(path);
    }

    let by_file_path = out_dir.join("stability_summary_by_file.csv");
    {
        let mut w = BufWriter::new(File::create(&by_file_path)?);
        writeln!(w, "file,R,Y,n,median,lo,hi,frac_pos")?;
        for row in &input.summary.by_file {
            writeln!(
                w,
                "{},{},{},{},{},{},{},{}",
                row.file,
                format_f64_12(row.r),
                format_f64_3(row.y),
                row.n,
                format_e12(row.median),
                format_e12(row.lo),
                format_e12(row.hi),
                format_f64_6(row.frac_pos)
            )?;
        }
    }
    artifacts.push(by_file_path);

    let by_r_path = out_dir.join("stability_summary_by_R.csv");
    {
        let mut w = BufWriter::new(File::create(&by_r_path)?);
        writeln!(w, "R,n,median,lo,hi,frac_pos")?;
        for row in &input.summary.by_r {
            writeln!(
                w,
                "{},{},{},{},{},{}",
                format_f64_12(row.r),
                row.n,
                format_e12(row.median),
                format_e12(row.lo),
                format_e12(row.hi),
                format_f64_6(row.frac_pos)
            )?;
        }
    }
    artifacts.push(by_r_path);

    let sign_path = out_dir.join("sign_tests.csv");
    {
        let mut w = BufWriter::new(File::create(&sign_path)?);
        writeln!(w, "file,R,Y,M,hecke_err,S500,S1000,S2000,S5000")?;
        for (file, test) in input.files.iter().zip(input.sweep.sign_tests.iter()) {
            writeln!(
                w,
                "{},{},{},{},{},{},{},{},{}",
                file.base,
                format_f64_12(file.meta.r.value_or_nan()),
                format_f64_3(file.meta.y.value_or_nan()),
                file.m(),
                format_e12(test.hecke_err),
                format_f64_6(test.prime_sums[0]),
                format_f64_6(test.prime_sums[1]),
                format_f64_6(test.prime_sums[2]),
                format_f64_6(test.prime_sums[3])
            )?;
        }
    }
    artifacts.push(sign_path);

    match write_plots(
        &input.summary.by_r,
        &out_dir.join("plots"),
        input.outfmt,
        input.dpi,
    ) {
        Ok(paths) => artifacts.extend(paths),
        Err(err) => warn!("plotting failed: {err}; tabular outputs are unaffected"),
    }

    let summary = RunSummary {
        tool: "maass-lstab",
        version: env!("CARGO_PKG_VERSION"),
        input_dir: input.input_dir.clone(),
        n_files: input.files.len(),
        n_groups: input.summary.by_r.len(),
        deltas: input.deltas.to_vec(),
        smooths: input.smooths.to_vec(),
        boot_reps: input.boot,
        seed: input.seed,
        artifacts: artifacts
            .iter()
            .map(|p| p.display().to_string())
            .collect(),
    };
    let json_path = out_dir.join("run_summary.json");
    let json = render_run_summary(&summary).map_err(std::io::Error::other)?;
    fs::write(&json_path, json)?;
    artifacts.push(json_path);

    info!("wrote {} artifact(s) under {}", artifacts.len(), out_dir.display());
    Ok(artifacts)
}

#[cfg(test)]
#[path = "../../tests/src_inline/pipeline/stage5_report.rs"]
mod tests;
