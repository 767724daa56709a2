/// Score as a percentage of the question count; 0 when there were no questions.
pub fn percentage(score: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        (score as f64 / total as f64) * 100.0
    }
}

pub fn mean(data: &[f64]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().sum::<f64>() / count as f64),
    }
}

/// Population standard deviation.
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let data_mean = mean(data)?;
    let variance = data
        .iter()
        .map(|value| {
            let diff = data_mean - *value;

            diff * diff
        })
        .sum::<f64>()
        / data.len() as f64;

    Some(variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(2, 3), 2.0 / 3.0 * 100.0);
        assert_eq!(percentage(5, 5), 100.0);
        assert_eq!(percentage(0, 4), 0.0);
    }

    #[test]
    fn test_percentage_no_questions() {
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[50.0, 100.0, 75.0]), Some(75.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[60.0, 60.0, 60.0]), Some(0.0));
        assert_eq!(std_dev(&[0.0, 100.0]), Some(50.0));
        assert_eq!(std_dev(&[]), None);
    }
}
