//! Analysis configuration
//!
//! Thresholds were chosen by visual inspection of the sales distribution of
//! the 1980-2016 dataset: totals of 80M and above are isolated outliers, yearly
//! release counts look stable from 2003 through 2015, and 2016 is incomplete.
//! Every value can be overridden through [`AnalysisConfig`].

use serde::{Deserialize, Serialize};

use crate::{filter::YearWindow, hypothesis::ScoreKind, segment::Predicate};

/// Rows with `total_sales` at or above this are treated as outliers.
pub const OUTLIER_THRESHOLD: f64 = 80.0;
/// Exclusive lower bound of the stable year window.
pub const WINDOW_AFTER: i32 = 2002;
/// Exclusive upper bound of the stable year window.
pub const WINDOW_BEFORE: i32 = 2016;
/// Most recent, incomplete year, analyzed separately.
pub const SNAPSHOT_YEAR: i32 = 2016;
/// Significance level of the hypothesis tests.
pub const ALPHA: f64 = 0.05;
/// Length of the ranking lists in the report.
pub const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    pub outlier_threshold: f64,
    pub window: YearWindow,
    pub snapshot_year: i32,
    pub alpha: f64,
    pub top_n: usize,
    pub hypotheses: Vec<HypothesisSpec>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            outlier_threshold: OUTLIER_THRESHOLD,
            window: YearWindow::new(WINDOW_AFTER, WINDOW_BEFORE),
            snapshot_year: SNAPSHOT_YEAR,
            alpha: ALPHA,
            top_n: TOP_N,
            hypotheses: HypothesisSpec::defaults(),
        }
    }
}

/// A named comparison between two segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisSpec {
    pub name: String,
    pub a: Predicate,
    pub b: Predicate,
    #[serde(default)]
    pub score: ScoreKind,
}

impl HypothesisSpec {
    /// User ratings of Xbox One vs PC, and of the Action vs Sports genres.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                name: "xone_vs_pc_user_score".to_owned(),
                a: Predicate::platform("XOne"),
                b: Predicate::platform("PC"),
                score: ScoreKind::User,
            },
            Self {
                name: "action_vs_sports_user_score".to_owned(),
                a: Predicate::genre("Action"),
                b: Predicate::genre("Sports"),
                score: ScoreKind::User,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"alpha": 0.01, "window": {"after": 2005, "before": 2015}}"#)
                .unwrap();
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.window, YearWindow::new(2005, 2015));
        assert_eq!(config.outlier_threshold, OUTLIER_THRESHOLD);
        assert_eq!(config.hypotheses.len(), 2);
    }

    #[test]
    fn test_hypotheses_round_trip_through_text() {
        let json = r#"{"hypotheses": [{"name": "wii", "a": "platform=Wii", "b": "platform=DS & year>2005", "score": "critic"}]}"#;
        let config: AnalysisConfig = serde_json::from_str(json).unwrap();
        let spec = &config.hypotheses[0];
        assert_eq!(spec.a, Predicate::platform("Wii"));
        assert_eq!(spec.score, ScoreKind::Critic);
        let back = serde_json::to_value(spec).unwrap();
        assert_eq!(back["b"], "platform=DS & year>2005");
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(serde_json::from_str::<AnalysisConfig>(r#"{"alpah": 0.1}"#).is_err());
    }
}
