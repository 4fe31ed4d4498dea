pub mod stage2_evaluate;
pub mod stage3_sweep;
pub mod stage4_aggregate;
pub mod stage5_report;

/// One point of the stability grid: finite-difference offset and
/// exponential smoothing scale. Both strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalParams {
    pub delta: f64,
    pub smooth: f64,
}
