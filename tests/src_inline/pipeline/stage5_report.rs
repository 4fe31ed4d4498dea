use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::input::meta::parse_file_meta;
use crate::pipeline::stage3_sweep::{SweepGrid, run_stage3};
use crate::pipeline::stage4_aggregate::run_stage4;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("maass_lstab_report_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn make_file(name: &str, phase: f64) -> LoadedFile {
    let mut coeffs = vec![1.0f64];
    for n in 2..=20usize {
        coeffs.push(((n as f64) * 1.1 + phase).sin() * 0.5);
    }
    LoadedFile {
        path: PathBuf::from(name),
        base: name.to_string(),
        meta: parse_file_meta(name),
        coeffs,
    }
}

fn fixture() -> (Vec<LoadedFile>, SweepGrid) {
    let files = vec![
        make_file("coeffs_R_030.279048499140_Y_0.010.txt", 0.2),
        make_file("coeffs_R_030.279048499140_Y_0.020.txt", 0.0),
    ];
    let grid = SweepGrid {
        deltas: vec![0.01],
        smooths: vec![2000.0],
    };
    (files, grid)
}

fn write_fixture(out_dir: &PathBuf, seed: u64) -> Vec<PathBuf> {
    let (files, grid) = fixture();
    let sweep = run_stage3(&files, &grid);
    let summary = run_stage4(&files, &sweep.trials, 300, seed);
    write_outputs(
        &Stage5Input {
            files: &files,
            sweep: &sweep,
            summary: &summary,
            input_dir: "fixture".to_string(),
            deltas: &grid.deltas,
            smooths: &grid.smooths,
            boot: 300,
            seed,
            // Pdf keeps the test off the rendering backend entirely.
            outfmt: PlotFormat::Pdf,
            dpi: 100,
        },
        out_dir,
    )
    .unwrap()
}

#[test]
fn test_output_tree_and_headers() {
    let out = make_temp_dir();
    write_fixture(&out, 7);

    let stab = out.join("stability/coeffs_R_030.279048499140_Y_0.010.stab.csv");
    let text = fs::read_to_string(&stab).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("delta,smooth,R,Y,M,L0,Lprime"));
    let row = lines.next().unwrap();
    assert!(row.starts_with("0.01,2000,30.279048499140,0.010,20,"));
    assert_eq!(lines.next(), None);

    let by_file = fs::read_to_string(out.join("stability_summary_by_file.csv")).unwrap();
    assert!(by_file.starts_with("file,R,Y,n,median,lo,hi,frac_pos\n"));
    assert_eq!(by_file.lines().count(), 3);

    let by_r = fs::read_to_string(out.join("stability_summary_by_R.csv")).unwrap();
    assert!(by_r.starts_with("R,n,median,lo,hi,frac_pos\n"));
    assert_eq!(by_r.lines().count(), 2);
    assert!(by_r.lines().nth(1).unwrap().starts_with("30.279048499140,2,"));

    let signs = fs::read_to_string(out.join("sign_tests.csv")).unwrap();
    assert!(signs.starts_with("file,R,Y,M,hecke_err,S500,S1000,S2000,S5000\n"));
    assert_eq!(signs.lines().count(), 3);
}

#[test]
fn test_run_summary_json_is_valid() {
    let out = make_temp_dir();
    let artifacts = write_fixture(&out, 7);
    assert!(artifacts.iter().any(|p| p.ends_with("run_summary.json")));

    let text = fs::read_to_string(out.join("run_summary.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["tool"], "maass-lstab");
    assert_eq!(value["n_files"], 2);
    assert_eq!(value["n_groups"], 1);
    assert_eq!(value["boot_reps"], 300);
}

#[test]
fn test_summaries_byte_identical_across_runs() {
    let out_a = make_temp_dir();
    let out_b = make_temp_dir();
    write_fixture(&out_a, 42);
    write_fixture(&out_b, 42);

    for name in ["stability_summary_by_file.csv", "stability_summary_by_R.csv"] {
        let a = fs::read(out_a.join(name)).unwrap();
        let b = fs::read(out_b.join(name)).unwrap();
        assert_eq!(a, b, "{name} differs between identical runs");
    }
}
