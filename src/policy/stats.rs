// src/policy/stats.rs
//
// Small numeric helpers for the aggregator. Rounding is half-to-even
// throughout, so 22.5 rounds to 22 and 23.5 to 24.

/// Round half-to-even and return as a signed integer.
#[inline]
pub fn round_even(v: f64) -> i64 {
    v.round_ties_even() as i64
}

#[inline]
pub fn clamp(value: i64, min: i64, max: i64) -> u32 {
    value.max(min).min(max) as u32
}

/// Median of a non-empty sample. Even-sized samples average the middle pair.
pub fn median(values: &[i64]) -> Option<f64> {
    if values.is_empty() { return None; }
    let mut v = values.to_vec();
    v.sort_unstable();
    let n = v.len();
    let mid = n / 2;
    if n % 2 == 1 {
        Some(v[mid] as f64)
    } else {
        Some((v[mid - 1] as f64 + v[mid] as f64) / 2.0)
    }
}

/// Percentile `q` in [0, 100] with linear interpolation between closest ranks.
pub fn percentile(values: &[i64], q: f64) -> Option<f64> {
    if values.is_empty() { return None; }
    let mut v = values.to_vec();
    v.sort_unstable();

    let rank = (v.len() - 1) as f64 * (q / 100.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let lo_v = v[lo] as f64;
    let hi_v = v[hi] as f64;
    Some(lo_v + (hi_v - lo_v) * (rank - lo as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_even() {
        assert_eq!(median(&[40, 10, 20, 30, 20]), Some(20.0));
        assert_eq!(median(&[10, 35, 20, 40]), Some(27.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn percentile_interpolates() {
        assert_eq!(percentile(&[10, 20, 20, 30, 40], 75.0), Some(30.0));
        // rank = 3 * 0.75 = 2.25 → 30 + 0.25 * (40 - 30)
        assert_eq!(percentile(&[10, 20, 30, 40], 75.0), Some(32.5));
        assert_eq!(percentile(&[7], 75.0), Some(7.0));
    }

    #[test]
    fn rounding_is_half_even() {
        assert_eq!(round_even(22.5), 22);
        assert_eq!(round_even(23.5), 24);
        assert_eq!(round_even(-0.4), 0);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(-3, 0, 60), 0);
        assert_eq!(clamp(75, 0, 70), 70);
        assert_eq!(clamp(12, 0, 15), 12);
    }
}
