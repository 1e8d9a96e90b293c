//! Row filters and the snapshot-year summary
//!
//! Both filters consume a table and return a new one:
//!
//! - [`remove_outliers`] drops rows whose total sales reach the threshold
//! - [`restrict_window`] keeps rows strictly inside a [`YearWindow`]
//!
//! The snapshot year is kept out of the window and summarized separately by
//! [`SnapshotSummary`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{record::Record, table::GameTable};

/// Open interval of release years, `after < year < before`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearWindow {
    pub after: i32,
    pub before: i32,
}

impl YearWindow {
    #[must_use]
    pub fn new(after: i32, before: i32) -> Self {
        Self { after, before }
    }

    /// Whether `year` lies strictly inside the window; unknown years never do.
    #[must_use]
    pub fn contains(&self, year: Option<i32>) -> bool {
        year.is_some_and(|year| self.after < year && year < self.before)
    }
}

/// Drops rows with `total_sales >= threshold`.
#[must_use]
pub fn remove_outliers(table: GameTable, threshold: f64) -> GameTable {
    let before = table.len();
    let table = table.retain(|record| record.total_sales() < threshold);
    tracing::debug!(
        threshold,
        dropped = before - table.len(),
        "removed sales outliers"
    );
    table
}

/// Keeps rows whose release year lies inside `window`.
#[must_use]
pub fn restrict_window(table: GameTable, window: YearWindow) -> GameTable {
    let before = table.len();
    let table = table.retain(|record| window.contains(record.release_year));
    tracing::debug!(
        after = window.after,
        before = window.before,
        dropped = before - table.len(),
        "restricted to year window"
    );
    table
}

/// Platforms active in the snapshot year, compared against a reference table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub year: i32,
    /// Platforms with at least one positive-sales row in the snapshot year,
    /// in order of first appearance.
    pub active_platforms: Vec<String>,
    /// Active platforms that never appear in the reference table.
    pub new_platforms: Vec<String>,
}

impl SnapshotSummary {
    /// Summarizes `year` in `source` against the platforms of `reference`.
    #[must_use]
    pub fn new(source: &GameTable, year: i32, reference: &GameTable) -> Self {
        let active_platforms = distinct_platforms(
            source
                .records()
                .iter()
                .filter(|record| record.release_year == Some(year) && record.total_sales() > 0.0),
        );
        let known = reference
            .records()
            .iter()
            .map(|record| record.platform.as_str())
            .collect::<HashSet<_>>();
        let new_platforms = active_platforms
            .iter()
            .filter(|platform| !known.contains(platform.as_str()))
            .cloned()
            .collect::<Vec<_>>();
        if !new_platforms.is_empty() {
            tracing::info!(year, platforms = ?new_platforms, "platforms new in snapshot year");
        }
        Self {
            year,
            active_platforms,
            new_platforms,
        }
    }
}

fn distinct_platforms<'a, I>(records: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.platform.as_str()))
        .map(|record| record.platform.clone())
        .collect()
}
