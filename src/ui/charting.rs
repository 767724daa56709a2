use crate::time_series::TrendPoint;

/// The score axis is fixed so trends stay comparable between banks.
pub const PERCENT_BOUNDS: [f64; 2] = [0.0, 100.0];

/// X bounds (attempt ordinals) for the history trend chart
pub fn compute_trend_bounds(points: &[TrendPoint]) -> [f64; 2] {
    let last = points.last().map(|p| p.attempt).unwrap_or(1.0);
    [1.0, last.max(2.0)]
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_bounds() {
        assert_eq!(compute_trend_bounds(&[]), [1.0, 2.0]);
        assert_eq!(compute_trend_bounds(&[TrendPoint::new(1.0, 50.0)]), [1.0, 2.0]);
        let points: Vec<TrendPoint> = (1..=7).map(|i| TrendPoint::new(i as f64, 10.0)).collect();
        assert_eq!(compute_trend_bounds(&points), [1.0, 7.0]);
    }

    #[test]
    fn test_format_label() {
        assert_eq!(format_label(1.0), "1");
        assert_eq!(format_label(66.6666), "66.67");
    }
}
