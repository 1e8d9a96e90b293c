//! Aggregates over segments
//!
//! Missing values are skipped, never counted as zero. Groupings keep the order
//! in which keys first appear in the segment, and rankings sort stably, so
//! ties stay in first-appearance order.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use vgsales_stats::{
    correlation::pearson, descriptive::DescriptiveStats, percentiles::BoxPlotSummary,
};

use crate::{
    record::{Column, Dimension, Record, Region},
    segment::Segment,
};

/// Count, sum, mean, population variance, standard deviation, min, max and
/// median of a column; `None` when the segment has no value for it.
#[must_use]
pub fn summary(segment: &Segment<'_>, column: Column) -> Option<DescriptiveStats> {
    DescriptiveStats::new(segment.values(column))
}

/// Pearson correlation over rows where both columns are present.
#[must_use]
pub fn correlation(segment: &Segment<'_>, x: Column, y: Column) -> Option<f64> {
    pearson(
        segment
            .iter()
            .filter_map(|record| Some((x.value(record)?, y.value(record)?))),
    )
}

/// Pairwise correlations over a column list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    /// Row-major; `values[i][j]` correlates `columns[i]` with `columns[j]`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Columns of the score-versus-sales matrix.
    pub const SCORES_VS_SALES: [Column; 5] = [
        Column::CriticScore,
        Column::UserScore,
        Column::NaSales,
        Column::EuSales,
        Column::JpSales,
    ];

    #[must_use]
    pub fn new(segment: &Segment<'_>, columns: &[Column]) -> Self {
        let values = columns
            .iter()
            .map(|x| {
                columns
                    .iter()
                    .map(|y| correlation(segment, *x, *y))
                    .collect()
            })
            .collect();
        Self {
            columns: columns.to_vec(),
            values,
        }
    }

    #[must_use]
    pub fn get(&self, x: Column, y: Column) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == x)?;
        let j = self.columns.iter().position(|c| *c == y)?;
        self.values[i][j]
    }
}

/// Summed column value of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub value: f64,
}

/// Records grouped by `dimension`, in order of first appearance.
///
/// Records without a key for the dimension (unknown year) are left out.
#[must_use]
pub fn group_by<'a>(segment: &Segment<'a>, dimension: Dimension) -> Vec<(String, Vec<&'a Record>)> {
    let mut index = HashMap::new();
    let mut groups: Vec<(String, Vec<&'a Record>)> = vec![];
    for record in segment.iter() {
        let Some(key) = dimension.key(record) else {
            continue;
        };
        let i = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, vec![]));
            groups.len() - 1
        });
        groups[i].1.push(record);
    }
    groups
}

/// Per-group sums of `column`, in order of first appearance.
#[must_use]
pub fn group_sum(segment: &Segment<'_>, dimension: Dimension, column: Column) -> Vec<GroupTotal> {
    group_by(segment, dimension)
        .into_iter()
        .map(|(key, records)| GroupTotal {
            key,
            value: records.iter().filter_map(|r| column.value(r)).sum(),
        })
        .collect()
}

/// Group sums sorted descending; ties keep first-appearance order.
#[must_use]
pub fn rank(segment: &Segment<'_>, dimension: Dimension, column: Column) -> Vec<GroupTotal> {
    let mut totals = group_sum(segment, dimension, column);
    totals.sort_by(|a, b| b.value.total_cmp(&a.value));
    totals
}

/// The `n` groups with the largest sums.
#[must_use]
pub fn top_n(
    segment: &Segment<'_>,
    dimension: Dimension,
    column: Column,
    n: usize,
) -> Vec<GroupTotal> {
    let mut totals = rank(segment, dimension, column);
    totals.truncate(n);
    totals
}

/// The `n` groups with the smallest sums, smallest first.
#[must_use]
pub fn bottom_n(
    segment: &Segment<'_>,
    dimension: Dimension,
    column: Column,
    n: usize,
) -> Vec<GroupTotal> {
    let mut totals = group_sum(segment, dimension, column);
    totals.sort_by(|a, b| a.value.total_cmp(&b.value));
    totals.truncate(n);
    totals
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// Number of releases per known year, oldest first.
#[must_use]
pub fn games_per_year(segment: &Segment<'_>) -> Vec<YearCount> {
    let mut counts = BTreeMap::new();
    for year in segment.iter().filter_map(|record| record.release_year) {
        *counts.entry(year).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Total sales per platform per known year.
#[must_use]
pub fn platform_year_sales(segment: &Segment<'_>) -> BTreeMap<String, BTreeMap<i32, f64>> {
    let mut pivot = BTreeMap::<String, BTreeMap<i32, f64>>::new();
    for record in segment.iter() {
        let Some(year) = record.release_year else {
            continue;
        };
        *pivot
            .entry(record.platform.clone())
            .or_default()
            .entry(year)
            .or_default() += record.total_sales();
    }
    pivot
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformLifespan {
    pub platform: String,
    pub first_year: i32,
    pub last_year: i32,
}

impl PlatformLifespan {
    #[must_use]
    pub fn years(&self) -> i32 {
        self.last_year - self.first_year
    }
}

/// First and last release year of each listed platform.
///
/// Platforms without any known release year are skipped.
#[must_use]
pub fn lifespans(segment: &Segment<'_>, platforms: &[String]) -> Vec<PlatformLifespan> {
    platforms
        .iter()
        .filter_map(|platform| {
            let mut years = segment
                .iter()
                .filter(|record| record.platform == *platform)
                .filter_map(|record| record.release_year);
            let first = years.next()?;
            let (first_year, last_year) =
                years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
            Some(PlatformLifespan {
                platform: platform.clone(),
                first_year,
                last_year,
            })
        })
        .collect()
}

/// Mean of `last_year - first_year`; `None` for an empty list.
#[must_use]
pub fn mean_lifespan(lifespans: &[PlatformLifespan]) -> Option<f64> {
    DescriptiveStats::new(lifespans.iter().map(|l| f64::from(l.years()))).map(|s| s.mean)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformBoxPlot {
    pub platform: String,
    pub summary: BoxPlotSummary,
}

/// Box-plot summaries of total sales, overall and per platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesBoxPlots {
    pub overall: Option<BoxPlotSummary>,
    pub by_platform: Vec<PlatformBoxPlot>,
}

impl SalesBoxPlots {
    #[must_use]
    pub fn new(segment: &Segment<'_>, platforms: &[String]) -> Self {
        let overall = BoxPlotSummary::new(segment.values(Column::TotalSales));
        let by_platform = platforms
            .iter()
            .filter_map(|platform| {
                let summary = BoxPlotSummary::new(
                    segment
                        .iter()
                        .filter(|record| record.platform == *platform)
                        .map(Record::total_sales),
                )?;
                Some(PlatformBoxPlot {
                    platform: platform.clone(),
                    summary,
                })
            })
            .collect();
        Self {
            overall,
            by_platform,
        }
    }
}

/// A group's sales and its fraction of the region total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub key: String,
    pub sales: f64,
    /// `sales / region total`; zero when the region sold nothing.
    pub share: f64,
}

/// Leading platforms, genres and ratings of one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalProfile {
    pub region: Region,
    pub total: f64,
    pub platforms: Vec<Share>,
    pub genres: Vec<Share>,
    pub ratings: Vec<Share>,
}

impl RegionalProfile {
    #[must_use]
    pub fn new(segment: &Segment<'_>, region: Region, n: usize) -> Self {
        let column = Column::from(region);
        let total = segment.values(column).iter().sum::<f64>();
        let shares = |dimension| {
            top_n(segment, dimension, column, n)
                .into_iter()
                .map(|GroupTotal { key, value }| Share {
                    key,
                    sales: value,
                    share: if total > 0.0 { value / total } else { 0.0 },
                })
                .collect()
        };
        Self {
            region,
            total,
            platforms: shares(Dimension::Platform),
            genres: shares(Dimension::Genre),
            ratings: shares(Dimension::Rating),
        }
    }
}

/// Values of `column` that are present and strictly positive.
///
/// Zero scores are excluded along with missing ones: the source records a
/// number of unrated titles as `0`.
#[must_use]
pub fn positive_values(segment: &Segment<'_>, column: Column) -> Vec<f64> {
    segment
        .values(column)
        .into_iter()
        .filter(|value| *value > 0.0)
        .collect()
}

/// Spread of user and critic scores within one genre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreScoreProfile {
    pub genre: String,
    pub user: Option<DescriptiveStats>,
    pub critic: Option<DescriptiveStats>,
}

/// Score profiles of every genre, in order of first appearance.
#[must_use]
pub fn genre_score_profiles(segment: &Segment<'_>) -> Vec<GenreScoreProfile> {
    group_by(segment, Dimension::Genre)
        .into_iter()
        .map(|(genre, records)| {
            let group = Segment::new(records);
            GenreScoreProfile {
                genre,
                user: DescriptiveStats::new(positive_values(&group, Column::UserScore)),
                critic: DescriptiveStats::new(positive_values(&group, Column::CriticScore)),
            }
        })
        .collect()
}
