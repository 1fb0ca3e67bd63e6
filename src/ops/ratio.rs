// ============================================================================
// RATIO CALCULATOR — value ÷ φ and value × φ
// ============================================================================

use serde::Serialize;

/// The golden ratio as a fixed 13-significant-digit literal.
///
/// Every calculator result and every overlay coordinate is derived from this
/// exact value, never from `(1 + √5) / 2`.
pub const PHI: f64 = 1.618033988749;

/// The two φ-derived companions of an input value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RatioResult {
    /// `value / φ`
    pub smaller: f64,
    /// `value × φ`
    pub larger: f64,
}

impl RatioResult {
    /// The degenerate result shown for empty, invalid or non-positive input.
    pub const ZERO: RatioResult = RatioResult {
        smaller: 0.0,
        larger: 0.0,
    };

    pub fn is_zero(&self) -> bool {
        self.smaller == 0.0 && self.larger == 0.0
    }
}

/// Parse free-form user input and compute its golden companions.
///
/// Never fails: anything that does not parse to a finite, strictly positive
/// number yields [`RatioResult::ZERO`].
pub fn compute(input: &str) -> RatioResult {
    match input.trim().parse::<f64>() {
        Ok(v) => compute_value(v),
        Err(_) => RatioResult::ZERO,
    }
}

/// Same as [`compute`] for an already-parsed number.
pub fn compute_value(v: f64) -> RatioResult {
    if !v.is_finite() || v <= 0.0 {
        return RatioResult::ZERO;
    }
    RatioResult {
        smaller: v / PHI,
        larger: v * PHI,
    }
}

/// Display formatting used by every front end (3 decimal places).
pub fn format_value(v: f64) -> String {
    format!("{:.3}", v)
}

/// First `n` Fibonacci numbers, starting `1, 1, 2, 3, …`.
pub fn fibonacci(n: usize) -> Vec<u64> {
    let mut seq = Vec::with_capacity(n);
    let (mut a, mut b) = (1u64, 1u64);
    for _ in 0..n {
        seq.push(a);
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    seq
}

/// Adjacent-Fibonacci ratios shown on the gallery card, as
/// `(numerator, denominator, ratio)`.
pub fn convergents() -> Vec<(u64, u64, f64)> {
    const PAIRS: [(u64, u64); 5] = [(5, 3), (8, 5), (13, 8), (21, 13), (144, 89)];
    PAIRS
        .iter()
        .map(|&(n, d)| (n, d, n as f64 / d as f64))
        .collect()
}
