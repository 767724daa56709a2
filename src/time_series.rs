/// One point of the history trend: attempt ordinal (1-based, oldest first)
/// against the score percentage of that attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub attempt: f64,
    pub percent: f64,
}

impl TrendPoint {
    pub fn new(attempt: f64, percent: f64) -> Self {
        Self { attempt, percent }
    }
}

impl From<(f64, f64)> for TrendPoint {
    fn from(v: (f64, f64)) -> Self {
        TrendPoint {
            attempt: v.0,
            percent: v.1,
        }
    }
}

impl From<TrendPoint> for (f64, f64) {
    fn from(p: TrendPoint) -> Self {
        (p.attempt, p.percent)
    }
}
