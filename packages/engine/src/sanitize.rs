//! Numeric sanitization
//!
//! Small helpers that keep scores and weights finite and inside their ranges.

/// Upper bound of every mastery score.
pub const MAX_SCORE: f64 = 100.0;

/// Replace NaN/Inf with `fallback`.
pub fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

/// Clamp a mastery score into [0, 100], treating invalid values as 0.
pub fn clamp_score(score: f64) -> f64 {
    finite_or(score, 0.0).clamp(0.0, MAX_SCORE)
}

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Shortfall between a target and a current score as a fraction of the
/// score range, `max(0, target - current) / 100`.
pub fn mastery_deficit(target: f64, current: f64) -> f64 {
    ((clamp_score(target) - clamp_score(current)) / MAX_SCORE).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(f64::NAN), 0.0);
        assert_eq!(clamp_score(150.0), 100.0);
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(clamp_score(42.5), 42.5);
    }

    #[test]
    fn test_mastery_deficit() {
        assert!((mastery_deficit(80.0, 30.0) - 0.5).abs() < 1e-12);
        assert_eq!(mastery_deficit(80.0, 95.0), 0.0);
    }

    #[test]
    fn test_round1() {
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(0.04), 0.0);
    }
}
