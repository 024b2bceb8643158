// src/aggregate/stats.rs

use serde::Serialize;

/// Descriptive statistics over the present values of one measure.
/// Every statistic is `None` when there is nothing to describe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Number of present values the statistics were computed from.
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub median: Option<f64>,
}

impl Summary {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut v: Vec<f64> = values.into_iter().collect();
        let n = v.len();
        if n == 0 {
            return Self::default();
        }
        v.sort_by(f64::total_cmp);

        let mean = v.iter().sum::<f64>() / n as f64;
        let std = (n > 1).then(|| {
            let ss: f64 = v.iter().map(|x| (x - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        });
        let median = if n % 2 == 1 {
            v[n / 2]
        } else {
            (v[n / 2 - 1] + v[n / 2]) / 2.0
        };

        Self {
            count: n,
            mean: Some(mean),
            std,
            min: v.first().copied(),
            max: v.last().copied(),
            median: Some(median),
        }
    }
}

/// Mean of the present values, `None` when there are none.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_present_values() {
        let s = Summary::from_values([4.0, 1.0, 3.0, 2.0]);
        assert_eq!(s.count, 4);
        assert_eq!(s.mean, Some(2.5));
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(4.0));
        assert_eq!(s.median, Some(2.5));
        let std = s.std.unwrap_or_default();
        assert!((std - 1.290_994_448_735_805_6).abs() < 1e-12);
    }

    #[test]
    fn single_value_has_no_spread() {
        let s = Summary::from_values([95.2]);
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, Some(95.2));
        assert_eq!(s.median, Some(95.2));
        assert_eq!(s.std, None);
    }

    #[test]
    fn nothing_present_is_missing_not_zero() {
        assert_eq!(Summary::from_values(std::iter::empty()), Summary::default());
        assert_eq!(mean(Vec::new()), None);
        assert_eq!(mean([1.0, 2.0]), Some(1.5));
    }
}
