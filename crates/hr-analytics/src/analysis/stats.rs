//! Scalar statistics over `f64` slices.
//!
//! The column-oriented analyses extract their values into plain vectors and
//! delegate the arithmetic here, so the formulas live in exactly one place.

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance with the n-1 denominator. `None` below two observations.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / (values.len() - 1) as f64)
}

/// Sample standard deviation. `None` below two observations.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Quantile of an already-sorted slice using linear interpolation.
///
/// The quantile position is `q * (n - 1)`; when it falls between two
/// neighbours the result blends them by the fractional part. `None` for an
/// empty slice.
pub fn quantile_sorted(sorted: &[f64], quantile: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = quantile.clamp(0.0, 1.0) * (sorted.len() as f64 - 1.0);
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let weight = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Pearson correlation between two equal-length slices.
///
/// `None` when fewer than two pairs are available or either side has zero
/// variance; a coefficient is meaningless in both cases.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== mean / variance tests ====================

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_sample_variance_uses_n_minus_one() {
        // [2, 4, 6]: mean 4, squared deviations 4+0+4, variance 8/2 = 4
        assert_eq!(sample_variance(&[2.0, 4.0, 6.0]), Some(4.0));
        assert_eq!(sample_variance(&[5.0]), None);
    }

    #[test]
    fn test_sample_std() {
        assert_eq!(sample_std(&[2.0, 4.0, 6.0]), Some(2.0));
    }

    // ==================== quantile tests ====================

    #[test]
    fn test_quantile_sorted_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0];
        // position 0.25 * 3 = 0.75 -> 1 + 0.75 * (2 - 1)
        assert_eq!(quantile_sorted(&values, 0.25), Some(1.75));
        assert_eq!(quantile_sorted(&values, 0.5), Some(2.5));
        assert_eq!(quantile_sorted(&values, 1.0), Some(4.0));
    }

    #[test]
    fn test_quantile_sorted_exact_position() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        assert_eq!(quantile_sorted(&values, 0.25), Some(20.0));
        assert_eq!(quantile_sorted(&values, 0.75), Some(40.0));
    }

    #[test]
    fn test_quantile_sorted_edge_cases() {
        assert_eq!(quantile_sorted(&[], 0.5), None);
        assert_eq!(quantile_sorted(&[7.0], 0.25), Some(7.0));
    }

    // ==================== pearson tests ====================

    #[test]
    fn test_pearson_perfect_positive() {
        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let r = pearson(&[1.0, 2.0, 3.0], &[6.0, 4.0, 2.0]).unwrap();
        assert!((r + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_zero_variance_not_computable() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[2.0, 4.0, 6.0]), None);
        assert_eq!(pearson(&[2.0, 4.0, 6.0], &[3.0, 3.0, 3.0]), None);
    }

    #[test]
    fn test_pearson_needs_two_pairs() {
        assert_eq!(pearson(&[1.0], &[2.0]), None);
        assert_eq!(pearson(&[1.0, 2.0], &[2.0]), None);
    }

    #[test]
    fn test_pearson_known_value() {
        // x = [1,2,3,4,5], y = [2,1,4,3,5]: r = 0.8
        let r = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 1.0, 4.0, 3.0, 5.0]).unwrap();
        assert!((r - 0.8).abs() < 1e-12);
    }
}
