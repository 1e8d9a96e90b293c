//! Two-segment hypothesis tests
//!
//! Every comparison follows the same procedure:
//!
//! 1. Build a score sample for each segment, dropping missing and
//!    non-positive scores.
//! 2. Check whether the two sample variances are equal. The check is reported
//!    but never changes the test.
//! 3. Run Welch's unequal-variance t-test.
//! 4. Reject the null hypothesis of equal means when `p < alpha`.

use std::fmt;

use serde::{Deserialize, Serialize};
use vgsales_stats::{
    InsufficientDataError,
    t_test::{VarianceCheck, WelchTTest},
};

use crate::{
    aggregate,
    config::HypothesisSpec,
    record::Column,
    segment::{Predicate, Segment},
};

/// Score compared by a hypothesis test.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::FromStr,
)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    #[default]
    #[display("user")]
    User,
    #[display("critic")]
    Critic,
}

impl ScoreKind {
    #[must_use]
    pub fn column(self) -> Column {
        match self {
            ScoreKind::User => Column::UserScore,
            ScoreKind::Critic => Column::CriticScore,
        }
    }
}

/// Score sample of a segment: present, strictly positive scores.
#[must_use]
pub fn score_sample(segment: &Segment<'_>, kind: ScoreKind) -> Vec<f64> {
    aggregate::positive_values(segment, kind.column())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum Side {
    #[display("A")]
    A,
    #[display("B")]
    B,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("sample {side} ({segment}): {source}")]
pub struct HypothesisError {
    pub side: Side,
    pub segment: String,
    pub source: InsufficientDataError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The means differ at the chosen significance level.
    RejectNull,
    FailToReject,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::RejectNull => "reject H0: means differ",
            Verdict::FailToReject => "fail to reject H0: no evidence the means differ",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisOutcome {
    pub name: String,
    pub a: String,
    pub b: String,
    pub score: ScoreKind,
    pub alpha: f64,
    pub verdict: Verdict,
    #[serde(flatten)]
    pub test: WelchTTest,
    pub variance: VarianceCheck,
}

/// Welch t-test runner at a fixed significance level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypothesisTest {
    pub alpha: f64,
}

impl HypothesisTest {
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    /// Compares the scores of the rows of `segment` matching `a` and `b`.
    pub fn compare(
        &self,
        name: &str,
        segment: &Segment<'_>,
        a: &Predicate,
        b: &Predicate,
        score: ScoreKind,
    ) -> Result<HypothesisOutcome, HypothesisError> {
        let sample_a = score_sample(&segment.matching(a), score);
        let sample_b = score_sample(&segment.matching(b), score);
        tracing::debug!(
            name,
            n_a = sample_a.len(),
            n_b = sample_b.len(),
            "built hypothesis samples"
        );

        let test = WelchTTest::new(&sample_a, &sample_b).map_err(|source| {
            let (side, failing) = if sample_a.len() < WelchTTest::MIN_SAMPLE_SIZE {
                (Side::A, a)
            } else {
                (Side::B, b)
            };
            HypothesisError {
                side,
                segment: failing.to_string(),
                source,
            }
        })?;
        // both samples hold at least two values here
        let variance = VarianceCheck::new(&sample_a, &sample_b).ok_or_else(|| HypothesisError {
            side: Side::A,
            segment: a.to_string(),
            source: InsufficientDataError::new(WelchTTest::MIN_SAMPLE_SIZE, sample_a.len()),
        })?;

        let verdict = if test.rejects(self.alpha) {
            Verdict::RejectNull
        } else {
            Verdict::FailToReject
        };
        tracing::info!(name, p_value = test.p_value, %verdict, "hypothesis tested");

        Ok(HypothesisOutcome {
            name: name.to_owned(),
            a: a.to_string(),
            b: b.to_string(),
            score,
            alpha: self.alpha,
            verdict,
            test,
            variance,
        })
    }

    /// Runs a configured comparison.
    pub fn run(
        &self,
        segment: &Segment<'_>,
        spec: &HypothesisSpec,
    ) -> Result<HypothesisOutcome, HypothesisError> {
        self.compare(&spec.name, segment, &spec.a, &spec.b, spec.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record::{Record, RegionalSales},
        table::GameTable,
    };

    fn scored(platform: &str, user: Option<f64>) -> Record {
        Record::new("g", platform, Some(2014), "Action", RegionalSales::new(1.0, 0.0, 0.0, 0.0))
            .with_scores(None, user)
    }

    fn table(a: &[f64], b: &[f64]) -> GameTable {
        a.iter()
            .map(|s| scored("XOne", Some(*s)))
            .chain(b.iter().map(|s| scored("PC", Some(*s))))
            .collect()
    }

    #[test]
    fn test_identical_segments_not_rejected() {
        let table = table(&[6.5, 7.0, 8.1, 5.9], &[6.5, 7.0, 8.1, 5.9]);
        let outcome = HypothesisTest::new(0.05)
            .compare(
                "same",
                &table.segment(),
                &Predicate::platform("XOne"),
                &Predicate::platform("PC"),
                ScoreKind::User,
            )
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::FailToReject);
        assert!(outcome.variance.equal);
        assert_eq!(outcome.test.n_a, 4);
    }

    #[test]
    fn test_separated_segments_rejected() {
        let table = table(&[1.0, 1.0, 1.0], &[9.0, 9.0, 9.0]);
        let outcome = HypothesisTest::new(0.05)
            .compare(
                "apart",
                &table.segment(),
                &Predicate::platform("XOne"),
                &Predicate::platform("PC"),
                ScoreKind::User,
            )
            .unwrap();
        assert_eq!(outcome.verdict, Verdict::RejectNull);
        assert_eq!(outcome.test.p_value, 0.0);
    }

    #[test]
    fn test_missing_and_zero_scores_excluded() {
        let mut records =
            table(&[7.5, 8.1, 6.9, 8.8, 7.2], &[6.0, 7.7, 5.5, 8.9, 6.3, 7.1]).into_records();
        records.push(scored("XOne", None));
        records.push(scored("XOne", Some(0.0)));
        records.push(scored("PC", Some(0.0)));
        let table = GameTable::new(records);
        let outcome = HypothesisTest::new(0.05)
            .compare(
                "ref",
                &table.segment(),
                &Predicate::platform("XOne"),
                &Predicate::platform("PC"),
                ScoreKind::User,
            )
            .unwrap();
        assert_eq!((outcome.test.n_a, outcome.test.n_b), (5, 6));
        assert!((outcome.test.p_value - 0.235_372_289_255_796_45).abs() < 1e-6);
        assert_eq!(outcome.verdict, Verdict::FailToReject);
    }

    #[test]
    fn test_alpha_decides_verdict() {
        let table = table(&[7.5, 8.1, 6.9, 8.8, 7.2], &[6.0, 7.7, 5.5, 8.9, 6.3, 7.1]);
        let verdict = |alpha| {
            HypothesisTest::new(alpha)
                .compare(
                    "ref",
                    &table.segment(),
                    &Predicate::platform("XOne"),
                    &Predicate::platform("PC"),
                    ScoreKind::User,
                )
                .map(|outcome| (outcome.alpha, outcome.verdict))
                .unwrap()
        };
        assert_eq!(verdict(0.05), (0.05, Verdict::FailToReject));
        assert_eq!(verdict(0.3), (0.3, Verdict::RejectNull));
    }

    #[test]
    fn test_empty_segment_fails_with_side() {
        let table = table(&[7.0, 8.0], &[]);
        let err = HypothesisTest::new(0.05)
            .compare(
                "empty",
                &table.segment(),
                &Predicate::platform("XOne"),
                &Predicate::platform("PC"),
                ScoreKind::User,
            )
            .unwrap_err();
        assert_eq!(err.side, Side::B);
        assert_eq!(err.segment, "platform=PC");
        assert_eq!(err.source.actual, 0);
    }

    #[test]
    fn test_score_kind_parses() {
        assert_eq!("critic".parse::<ScoreKind>().ok(), Some(ScoreKind::Critic));
        assert_eq!(ScoreKind::User.to_string(), "user");
    }
}
