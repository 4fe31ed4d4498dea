use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read an "index value" coefficient dump into a dense sequence covering
/// indices 1..=M, where M is the largest index seen. Unwritten indices
/// gap-fill to 0.0. Lines that do not parse are skipped; a single corrupt
/// line never aborts the load. An empty or fully unparseable file yields
/// an empty sequence.
pub fn load_coeffs(path: &Path) -> std::io::Result<Vec<f64>> {
    let file = File::open(path)?;
    Ok(parse_coeffs(BufReader::new(file)))
}

pub fn parse_coeffs<R: BufRead>(reader: R) -> Vec<f64> {
    let mut entries: Vec<(usize, f64)> = Vec::new();
    let mut max_index = 0usize;

    for line in reader.lines() {
        let Ok(line) = line else {
            continue;
        };
        let mut parts = line.split_whitespace();
        let (Some(idx_tok), Some(val_tok)) = (parts.next(), parts.next()) else {
            continue;
        };
        let Ok(idx) = idx_tok.parse::<usize>() else {
            continue;
        };
        if idx == 0 {
            continue;
        }
        let Ok(val) = val_tok.parse::<f64>() else {
            continue;
        };
        max_index = max_index.max(idx);
        entries.push((idx, val));
    }

    if max_index == 0 {
        return Vec::new();
    }
    let mut out = vec![0.0f64; max_index];
    for (idx, val) in entries {
        out[idx - 1] = val;
    }
    out
}
