//! Statistical kernels for the vgsales project.
//!
//! This crate holds the numeric side of the analysis, independent of the
//! sales record model:
//!
//! - **Descriptive statistics**: count, sum, mean, median, population variance, standard deviation
//! - **Percentiles**: linear-interpolated quantiles and box-plot summaries
//! - **Correlation**: Pearson correlation over paired observations
//! - **Hypothesis testing**: Welch's unequal-variance two-sample t-test
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Quantile computation and box-plot summaries
//! - [`correlation`]: Pearson correlation coefficient
//! - [`t_test`]: Welch's t-test with two-sided p-values
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use vgsales_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! assert_eq!(stats.variance, 2.0);
//! ```
//!
//! ## Comparing two samples
//!
//! ```
//! use vgsales_stats::t_test::WelchTTest;
//!
//! let test = WelchTTest::new(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]).unwrap();
//! assert!((test.p_value - 0.287_864_134_7).abs() < 1e-6);
//! ```

pub mod correlation;
pub mod descriptive;
pub mod percentiles;

/// Returned when a statistic needs more observations than it was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("insufficient data: need at least {required} observations, got {actual}")]
pub struct InsufficientDataError {
    /// Minimum number of observations the statistic requires.
    pub required: usize,
    /// Number of observations that were supplied.
    pub actual: usize,
}

impl InsufficientDataError {
    #[must_use]
    pub fn new(required: usize, actual: usize) -> Self {
        Self { required, actual }
    }
}
