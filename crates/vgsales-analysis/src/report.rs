//! Full analysis pipeline
//!
//! [`AnalysisReport::build`] runs every analysis over a normalized table:
//!
//! - release counts, platform lifespans and the snapshot summary use the
//!   normalized table before filtering
//! - everything else uses the filtered table (outliers removed, restricted to
//!   the stable year window)

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use vgsales_stats::descriptive::DescriptiveStats;

use crate::{
    aggregate::{
        self, CorrelationMatrix, GenreScoreProfile, GroupTotal, PlatformLifespan, RegionalProfile,
        SalesBoxPlots, YearCount,
    },
    config::AnalysisConfig,
    filter::{self, SnapshotSummary},
    hypothesis::{HypothesisOutcome, HypothesisTest},
    record::{Column, Dimension, Region},
    table::GameTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub loaded: usize,
    pub after_outliers: usize,
    pub in_window: usize,
}

/// Result of one configured comparison; failures are kept, not fatal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HypothesisEntry {
    Tested(HypothesisOutcome),
    Failed { name: String, error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub config: AnalysisConfig,
    pub rows: RowCounts,
    pub games_per_year: Vec<YearCount>,
    pub top_platforms: Vec<GroupTotal>,
    pub lifespans: Vec<PlatformLifespan>,
    pub mean_lifespan: Option<f64>,
    pub snapshot: SnapshotSummary,
    pub platform_year_sales: BTreeMap<String, BTreeMap<i32, f64>>,
    pub total_sales: Option<DescriptiveStats>,
    pub box_plots: SalesBoxPlots,
    pub correlations: CorrelationMatrix,
    pub top_genres: Vec<GroupTotal>,
    pub bottom_genres: Vec<GroupTotal>,
    pub regions: Vec<RegionalProfile>,
    pub genre_scores: Vec<GenreScoreProfile>,
    pub hypotheses: Vec<HypothesisEntry>,
}

impl AnalysisReport {
    #[must_use]
    pub fn build(table: &GameTable, config: &AnalysisConfig) -> Self {
        let all = table.segment();
        let top_platforms =
            aggregate::top_n(&all, Dimension::Platform, Column::TotalSales, config.top_n);
        let top_platform_names = top_platforms
            .iter()
            .map(|t| t.key.clone())
            .collect::<Vec<_>>();
        let lifespans = aggregate::lifespans(&all, &top_platform_names);
        let mean_lifespan = aggregate::mean_lifespan(&lifespans);

        let without_outliers = filter::remove_outliers(table.clone(), config.outlier_threshold);
        let after_outliers = without_outliers.len();
        let filtered = filter::restrict_window(without_outliers, config.window);
        let snapshot = SnapshotSummary::new(table, config.snapshot_year, &filtered);
        let rows = RowCounts {
            loaded: table.len(),
            after_outliers,
            in_window: filtered.len(),
        };
        tracing::info!(
            loaded = rows.loaded,
            after_outliers = rows.after_outliers,
            in_window = rows.in_window,
            "filtered dataset"
        );

        let window = filtered.segment();
        let tester = HypothesisTest::new(config.alpha);
        let hypotheses = config
            .hypotheses
            .iter()
            .map(|spec| match tester.run(&window, spec) {
                Ok(outcome) => HypothesisEntry::Tested(outcome),
                Err(err) => {
                    tracing::warn!(name = %spec.name, %err, "hypothesis not tested");
                    HypothesisEntry::Failed {
                        name: spec.name.clone(),
                        error: err.to_string(),
                    }
                }
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            config: config.clone(),
            rows,
            games_per_year: aggregate::games_per_year(&all),
            top_platforms,
            lifespans,
            mean_lifespan,
            platform_year_sales: aggregate::platform_year_sales(&window),
            total_sales: aggregate::summary(&window, Column::TotalSales),
            box_plots: SalesBoxPlots::new(&window, &snapshot.active_platforms),
            correlations: CorrelationMatrix::new(&window, &CorrelationMatrix::SCORES_VS_SALES),
            top_genres: aggregate::top_n(
                &window,
                Dimension::Genre,
                Column::TotalSales,
                config.top_n,
            ),
            bottom_genres: aggregate::bottom_n(
                &window,
                Dimension::Genre,
                Column::TotalSales,
                config.top_n,
            ),
            regions: Region::PROFILED
                .into_iter()
                .map(|region| RegionalProfile::new(&window, region, config.top_n))
                .collect(),
            genre_scores: aggregate::genre_score_profiles(&window),
            hypotheses,
            snapshot,
        }
    }

    /// Outcome of the named comparison, if it ran.
    #[must_use]
    pub fn hypothesis(&self, name: &str) -> Option<&HypothesisOutcome> {
        self.hypotheses.iter().find_map(|entry| match entry {
            HypothesisEntry::Tested(outcome) if outcome.name == name => Some(outcome),
            _ => None,
        })
    }
}
