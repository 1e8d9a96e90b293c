use serde::Serialize;

/// Precomputed percentile values for a dataset.
///
/// This structure stores percentile-value pairs for efficient lookup
/// of commonly used percentile points.
///
/// # Examples
///
/// ```
/// use vgsales_stats::percentiles::Percentiles;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
///
/// assert_eq!(percentiles.get(50.0), Some(5.5));
/// assert_eq!(percentiles.get(25.0), Some(3.25));
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Percentiles {
    /// Percentile-value pairs, sorted by percentile.
    /// Each tuple contains (percentile, value) where percentile is 0.0-100.0.
    values: Vec<(f64, f64)>,
}

impl Percentiles {
    /// Computes percentiles from sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64], percentile_points: &[f64]) -> Self {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let values = percentile_points
            .iter()
            .map(|&p| (p, compute_percentile(sorted_values, p)))
            .collect();
        Self { values }
    }

    /// Computes percentiles from unsorted values.
    #[must_use]
    pub fn new(values: &[f64], percentile_points: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, percentile_points)
    }

    /// Gets the value at a specific percentile.
    ///
    /// Returns `None` if the percentile was not precomputed.
    #[must_use]
    pub fn get(&self, percentile: f64) -> Option<f64> {
        self.values.iter().find_map(|(p, value)| {
            if (*p - percentile).abs() < f64::EPSILON {
                Some(*value)
            } else {
                None
            }
        })
    }

    /// Returns an iterator over all (percentile, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values.iter().copied()
    }
}

/// Computes a single percentile value from sorted data.
///
/// Uses linear interpolation between the two closest ranks: the `k`-th
/// percentile sits at fractional position `(n - 1) * k / 100`.
///
/// Returns `f64::NAN` if the input is empty.
///
/// # Examples
///
/// ```
/// use vgsales_stats::percentiles::compute_percentile;
///
/// let values = vec![1.0, 2.0, 3.0, 4.0];
/// assert_eq!(compute_percentile(&values, 50.0), 2.5);
/// assert_eq!(compute_percentile(&values, 100.0), 4.0);
/// ```
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn compute_percentile(sorted_values: &[f64], percentile: f64) -> f64 {
    if sorted_values.is_empty() {
        return f64::NAN;
    }
    let last = sorted_values.len() - 1;
    let position = (last as f64 * percentile.clamp(0.0, 100.0)) / 100.0;
    let lower = (position.floor() as usize).min(last);
    let upper = (position.ceil() as usize).min(last);
    let fraction = position - lower as f64;
    sorted_values[lower] + (sorted_values[upper] - sorted_values[lower]) * fraction
}

/// Five-number summary with Tukey fences, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Interquartile range (`q3 - q1`).
    pub iqr: f64,
    /// Smallest observation at or above `q1 - 1.5 * iqr`.
    pub lower_whisker: f64,
    /// Largest observation at or below `q3 + 1.5 * iqr`.
    pub upper_whisker: f64,
    /// Observations beyond either whisker.
    pub outliers: usize,
}

impl BoxPlotSummary {
    /// Tukey fence multiplier.
    pub const WHISKER_SCALE: f64 = 1.5;

    /// Summarizes unsorted values, or `None` for an empty dataset.
    ///
    /// # Examples
    ///
    /// ```
    /// use vgsales_stats::percentiles::BoxPlotSummary;
    ///
    /// let summary = BoxPlotSummary::new([1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
    /// assert_eq!(summary.median, 3.0);
    /// assert_eq!(summary.upper_whisker, 4.0);
    /// assert_eq!(summary.outliers, 1);
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        let min = *sorted.first()?;
        let max = *sorted.last()?;

        let q1 = compute_percentile(&sorted, 25.0);
        let median = compute_percentile(&sorted, 50.0);
        let q3 = compute_percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let low_fence = q1 - Self::WHISKER_SCALE * iqr;
        let high_fence = q3 + Self::WHISKER_SCALE * iqr;

        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|v| *v >= low_fence)
            .unwrap_or(min);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= high_fence)
            .unwrap_or(max);
        let outliers = sorted
            .iter()
            .filter(|v| **v < low_fence || **v > high_fence)
            .count();

        Some(Self {
            count: sorted.len(),
            min,
            q1,
            median,
            q3,
            max,
            iqr,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(compute_percentile(&[], 50.0).is_nan());
        assert!(BoxPlotSummary::new(Vec::new()).is_none());
    }

    #[test]
    fn test_single_value() {
        let summary = BoxPlotSummary::new([42.0]).unwrap();
        assert_eq!(summary.q1, 42.0);
        assert_eq!(summary.q3, 42.0);
        assert_eq!(summary.iqr, 0.0);
        assert_eq!(summary.outliers, 0);
    }

    #[test]
    fn test_interpolated_quartiles() {
        let values = (1..=10).map(f64::from).collect::<Vec<_>>();
        let summary = BoxPlotSummary::new(values).unwrap();
        assert_eq!(summary.q1, 3.25);
        assert_eq!(summary.median, 5.5);
        assert_eq!(summary.q3, 7.75);
        assert_eq!(summary.lower_whisker, 1.0);
        assert_eq!(summary.upper_whisker, 10.0);
    }

    #[test]
    fn test_skewed_distribution_outliers() {
        let mut values = vec![0.1; 20];
        values.extend([0.2, 0.3, 0.4, 35.0, 82.5]);
        let summary = BoxPlotSummary::new(values).unwrap();
        assert_eq!(summary.outliers, 5);
        assert_eq!(summary.upper_whisker, 0.1);
        assert_eq!(summary.max, 82.5);
    }

    #[test]
    fn test_unprecomputed_percentile() {
        let percentiles = Percentiles::new(&[3.0, 1.0, 2.0], &[50.0]);
        assert_eq!(percentiles.get(50.0), Some(2.0));
        assert_eq!(percentiles.get(90.0), None);
    }
}
