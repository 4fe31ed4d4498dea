use serde::Serialize;

/// Machine-readable run manifest written alongside the CSV tables.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: &'static str,
    pub version: &'static str,
    pub input_dir: String,
    pub n_files: usize,
    pub n_groups: usize,
    pub deltas: Vec<f64>,
    pub smooths: Vec<f64>,
    pub boot_reps: usize,
    pub seed: u64,
    pub artifacts: Vec<String>,
}

pub fn render_run_summary(summary: &RunSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}
