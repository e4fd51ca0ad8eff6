//! Numeric helpers shared by the scorers.
//!
//! All functions here are total: they never panic and never return a
//! non-finite value, so scores built from them stay inside [0, 100].

// ═══════════════════════════════════════════════════════════════════════════════
// SANITIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Replace NaN, infinities and negatives with zero
pub fn non_negative_finite(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Clamp a percentage into [0, 100], mapping non-finite input to 0
pub fn clamp_percent(value: f64) -> f64 {
    non_negative_finite(value).min(100.0)
}

/// Convert a sanitized float to u64, saturating at `u64::MAX`
pub fn to_u64_saturating(value: f64) -> u64 {
    let value = non_negative_finite(value).floor();
    if value >= u64::MAX as f64 {
        u64::MAX
    } else {
        value as u64
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RATIOS
// ═══════════════════════════════════════════════════════════════════════════════

/// `part / whole * 100`, clamped to [0, 100]; zero when `whole` is zero
pub fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    clamp_percent(part as f64 / whole as f64 * 100.0)
}

/// Balance between two counters as a 0-100 score.
///
/// Returns `None` when either counter is zero; callers decide what a
/// missing ratio is worth.
pub fn symmetry_score(a: u64, b: u64) -> Option<f64> {
    if a == 0 || b == 0 {
        return None;
    }
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    Some(clamp_percent(lo as f64 / hi as f64 * 100.0))
}

// ═══════════════════════════════════════════════════════════════════════════════
// AGGREGATES
// ═══════════════════════════════════════════════════════════════════════════════

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Gini coefficient of non-negative values, in [0, 1].
///
/// 0 means every value is equal, values near 1 mean one entry holds almost
/// everything. Empty input and all-zero input yield 0.
pub fn gini(values: &[u64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let mut sorted: Vec<f64> = values.iter().map(|v| *v as f64).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let total: f64 = sorted.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }

    // G = (2 * Σ i*x_i) / (n * Σ x_i) - (n + 1) / n, with 1-based ranks
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, x)| (i as f64 + 1.0) * x)
        .sum();
    let n = n as f64;
    let g = (2.0 * weighted) / (n * total) - (n + 1.0) / n;

    g.clamp(0.0, 1.0)
}

/// Round a 0-100 float score to an integer score
pub fn round_score(value: f64) -> u8 {
    clamp_percent(value).round() as u8
}
