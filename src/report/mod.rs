pub mod json;
pub mod plots;

/// Shortest natural rendering, used for grid values (0.005, 2000).
pub fn format_num(v: f64) -> String {
    format!("{v}")
}

/// Fixed 12 decimals, the precision R carries in file names.
pub fn format_f64_12(v: f64) -> String {
    format!("{:.12}", v)
}

/// Fixed 3 decimals, the precision Y carries in file names.
pub fn format_f64_3(v: f64) -> String {
    format!("{:.3}", v)
}

/// Scientific notation with 12 significant decimals, for L-values and
/// derivative estimates.
pub fn format_e12(v: f64) -> String {
    format!("{:.12e}", v)
}

pub fn format_f64_6(v: f64) -> String {
    format!("{:.6}", v)
}
