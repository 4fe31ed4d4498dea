use std::error::Error;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use plotters::prelude::*;
use tracing::warn;

use crate::pipeline::stage4_aggregate::GroupSummary;

const HIST_BINS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlotFormat {
    Png,
    Pdf,
    Both,
}

/// Best-effort rendering of the two summary plots: a histogram of per-R
/// medians and a scatter of median vs R with asymmetric error bars taken
/// from the bootstrap interval. Failures here never affect the tabular
/// outputs; the caller downgrades them to a logged notice.
pub fn write_plots(
    groups: &[GroupSummary],
    plots_dir: &Path,
    format: PlotFormat,
    dpi: u32,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    if matches!(format, PlotFormat::Pdf | PlotFormat::Both) {
        warn!("PDF plot backend unavailable; rendering PNG only");
    }
    if matches!(format, PlotFormat::Pdf) {
        return Ok(Vec::new());
    }

    let finite: Vec<&GroupSummary> = groups
        .iter()
        .filter(|g| g.r.is_finite() && g.median.is_finite())
        .collect();
    if finite.is_empty() {
        warn!("no finite per-R medians; skipping plots");
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(plots_dir)?;
    let size = plot_size(dpi);

    let hist_path = plots_dir.join("stability_hist.png");
    draw_median_histogram(&finite, &hist_path, size)?;

    let scatter_path = plots_dir.join("stability_vs_R.png");
    draw_median_vs_r(&finite, &scatter_path, size)?;

    Ok(vec![hist_path, scatter_path])
}

fn plot_size(dpi: u32) -> (u32, u32) {
    // 6 x 4 inch canvas. Anything past 2000 dpi is a typo, not a request
    // for a gigapixel raster, and 6 * dpi must not overflow u32.
    let dpi = dpi.clamp(50, 2000);
    (6 * dpi, 4 * dpi)
}

fn draw_median_histogram(
    groups: &[&GroupSummary],
    out_path: &Path,
    size: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    let medians: Vec<f64> = groups.iter().map(|g| g.median).collect();
    let (mut lo, mut hi) = min_max(&medians);
    if hi - lo < f64::EPSILON {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / HIST_BINS as f64;
    let mut counts = [0u32; HIST_BINS];
    for &m in &medians {
        let bin = (((m - lo) / width) as usize).min(HIST_BINS - 1);
        counts[bin] += 1;
    }
    let y_max = counts.iter().copied().max().unwrap_or(1) + 1;

    let root = BitMapBackend::new(out_path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Per-R median of L'(1/2)", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0u32..y_max)?;
    chart
        .configure_mesh()
        .x_desc("L'(1/2) median per R")
        .y_desc("count")
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &c)| {
        let x0 = lo + i as f64 * width;
        let x1 = x0 + width;
        Rectangle::new([(x0, 0), (x1, c)], BLUE.mix(0.5).filled())
    }))?;

    root.present()?;
    Ok(())
}

fn draw_median_vs_r(
    groups: &[&GroupSummary],
    out_path: &Path,
    size: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    let (mut x_lo, mut x_hi) = min_max(&groups.iter().map(|g| g.r).collect::<Vec<_>>());
    if x_hi - x_lo < f64::EPSILON {
        x_lo -= 0.5;
        x_hi += 0.5;
    }
    let x_pad = 0.05 * (x_hi - x_lo);

    let mut y_lo = 0.0f64;
    let mut y_hi = 0.0f64;
    for g in groups {
        let lo = if g.lo.is_finite() { g.lo } else { g.median };
        let hi = if g.hi.is_finite() { g.hi } else { g.median };
        y_lo = y_lo.min(lo);
        y_hi = y_hi.max(hi);
    }
    if y_hi - y_lo < f64::EPSILON {
        y_lo -= 0.5;
        y_hi += 0.5;
    }
    let y_pad = 0.05 * (y_hi - y_lo);

    let root = BitMapBackend::new(out_path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("L'(1/2) median vs R", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((x_lo - x_pad)..(x_hi + x_pad), (y_lo - y_pad)..(y_hi + y_pad))?;
    chart
        .configure_mesh()
        .x_desc("R")
        .y_desc("L'(1/2) median")
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(
        vec![(x_lo - x_pad, 0.0), (x_hi + x_pad, 0.0)],
        BLACK.mix(0.5),
    )))?;

    chart.draw_series(groups.iter().map(|g| {
        let lo = if g.lo.is_finite() { g.lo } else { g.median };
        let hi = if g.hi.is_finite() { g.hi } else { g.median };
        ErrorBar::new_vertical(g.r, lo, g.median, hi, BLUE.filled(), 10)
    }))?;

    root.present()?;
    Ok(())
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &v in values {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    (lo, hi)
}
