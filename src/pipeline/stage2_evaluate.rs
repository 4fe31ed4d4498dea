use crate::arith::{chi3, primes_up_to};
use crate::input::LoadedFile;
use crate::pipeline::EvalParams;

/// Distinguished evaluation point: the symmetry point of the functional
/// equation.
pub const S0: f64 = 0.5;

/// Taper lengths for the supplemental prime sign sums.
pub const SIGN_TEST_SCALES: [f64; 4] = [500.0, 1000.0, 2000.0, 5000.0];

/// Result of evaluating one coefficient file at one grid point.
#[derive(Debug, Clone)]
pub struct TrialRecord {
    pub delta: f64,
    pub smooth: f64,
    pub r: f64,
    pub y: f64,
    pub m: usize,
    pub l0: f64,
    pub lprime: f64,
}

/// Smoothed truncated Dirichlet series twisted by chi3:
///
///   L(s) = sum_{n=1..M} a_n * chi3(n) * n^(-s) * exp(-n / smooth)
///
/// Terms with chi3(n) = 0 contribute nothing and are skipped. Summation is
/// index-ascending; s is real throughout this pipeline, so real
/// exponentiation suffices.
pub fn l_of_s(a: &[f64], s: f64, smooth: f64) -> f64 {
    let mut tot = 0.0f64;
    for (i, &an) in a.iter().enumerate() {
        let n = (i + 1) as u64;
        let c = chi3(n);
        if c == 0 {
            continue;
        }
        let nf = n as f64;
        tot += an * f64::from(c) * nf.powf(-s) * (-nf / smooth).exp();
    }
    tot
}

/// Evaluate L(1/2) and the central finite-difference estimate of L'(1/2)
/// for one file at one grid point. Smaller delta means less difference-
/// operator bias but more sensitivity to truncation noise in L itself;
/// the sweep exists to probe that trade-off.
pub fn run_trial(file: &LoadedFile, params: EvalParams) -> TrialRecord {
    let a = &file.coeffs;
    let l_plus = l_of_s(a, S0 + params.delta, params.smooth);
    let l_minus = l_of_s(a, S0 - params.delta, params.smooth);
    let l0 = l_of_s(a, S0, params.smooth);
    TrialRecord {
        delta: params.delta,
        smooth: params.smooth,
        r: file.meta.r.value_or_nan(),
        y: file.meta.y.value_or_nan(),
        m: a.len(),
        l0,
        lprime: (l_plus - l_minus) / (2.0 * params.delta),
    }
}

/// Supplemental per-file diagnostics independent of the stability grid.
#[derive(Debug, Clone)]
pub struct SignTest {
    /// |a_4 - (a_2^2 - 1)|, NaN when M < 4. Small residual is a cheap
    /// consistency check of the Hecke multiplicativity of the dump.
    pub hecke_err: f64,
    /// Smoothed prime sums, one per entry of [`SIGN_TEST_SCALES`].
    pub prime_sums: [f64; 4],
}

/// Smoothed prime sum S_f(x) = sum_{p <= M, chi3(p) != 0} a_p * chi3(p) * exp(-p/x).
pub fn prime_sign_sum(a: &[f64], x: f64) -> f64 {
    let mut tot = 0.0f64;
    for p in primes_up_to(a.len()) {
        let c = chi3(p as u64);
        if c == 0 {
            continue;
        }
        tot += a[p - 1] * f64::from(c) * (-(p as f64) / x).exp();
    }
    tot
}

pub fn hecke_residual(a: &[f64]) -> f64 {
    if a.len() < 4 {
        return f64::NAN;
    }
    (a[3] - (a[1] * a[1] - 1.0)).abs()
}

pub fn run_sign_test(file: &LoadedFile) -> SignTest {
    let mut prime_sums = [0.0f64; 4];
    for (slot, &x) in prime_sums.iter_mut().zip(SIGN_TEST_SCALES.iter()) {
        *slot = prime_sign_sum(&file.coeffs, x);
    }
    SignTest {
        hecke_err: hecke_residual(&file.coeffs),
        prime_sums,
    }
}
