//! Sales record model
//!
//! One [`Record`] is one game released on one platform. Regional sales are held
//! in [`RegionalSales`], which derives the total at construction so the total
//! can never drift from the regional figures.
//!
//! # Missing Values
//!
//! Every field the source may leave blank is an `Option`:
//!
//! - `release_year`: `None` when the source has no (or an unparseable) year
//! - `critic_score` / `user_score`: `None` for blanks and for the `tbd` placeholder
//! - `rating`: `None` when no ESRB code was recorded
//!
//! A score of `0.0` is a real value and is kept distinct from `None`.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Sales region of the source dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Na,
    Eu,
    Jp,
    Other,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Na, Region::Eu, Region::Jp, Region::Other];

    /// Regions that get a per-region user profile.
    pub const PROFILED: [Region; 3] = [Region::Na, Region::Eu, Region::Jp];

    #[must_use]
    pub fn to_str(self) -> &'static str {
        match self {
            Region::Na => "NA",
            Region::Eu => "EU",
            Region::Jp => "JP",
            Region::Other => "Other",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.to_str(), f)
    }
}

/// Sales in the four regions (millions), plus their derived total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionalSales {
    na: f64,
    eu: f64,
    jp: f64,
    other: f64,
    total: f64,
}

impl RegionalSales {
    #[must_use]
    pub fn new(na: f64, eu: f64, jp: f64, other: f64) -> Self {
        Self {
            na,
            eu,
            jp,
            other,
            total: na + eu + jp + other,
        }
    }

    #[must_use]
    pub fn get(&self, region: Region) -> f64 {
        match region {
            Region::Na => self.na,
            Region::Eu => self.eu,
            Region::Jp => self.jp,
            Region::Other => self.other,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Copy with the total derived again from the regional values.
    #[must_use]
    pub fn recomputed(&self) -> Self {
        Self::new(self.na, self.eu, self.jp, self.other)
    }

    pub(crate) fn bits(&self) -> [u64; 4] {
        Region::ALL.map(|region| canonical_bits(self.get(region)))
    }
}

/// A single game/platform release.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    pub platform: String,
    pub release_year: Option<i32>,
    pub genre: String,
    pub sales: RegionalSales,
    pub critic_score: Option<f64>,
    pub user_score: Option<f64>,
    pub rating: Option<String>,
}

impl Record {
    /// Record with no scores and no rating.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        platform: impl Into<String>,
        release_year: Option<i32>,
        genre: impl Into<String>,
        sales: RegionalSales,
    ) -> Self {
        Self {
            name: name.into(),
            platform: platform.into(),
            release_year,
            genre: genre.into(),
            sales,
            critic_score: None,
            user_score: None,
            rating: None,
        }
    }

    #[must_use]
    pub fn with_scores(mut self, critic_score: Option<f64>, user_score: Option<f64>) -> Self {
        self.critic_score = critic_score;
        self.user_score = user_score;
        self
    }

    #[must_use]
    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = Some(rating.into());
        self
    }

    #[must_use]
    pub fn total_sales(&self) -> f64 {
        self.sales.total()
    }

    /// Full-row identity used for deduplication.
    pub(crate) fn row_key(&self) -> RowKey<'_> {
        RowKey {
            name: &self.name,
            platform: &self.platform,
            release_year: self.release_year,
            genre: &self.genre,
            sales: self.sales.bits(),
            critic_score: self.critic_score.map(canonical_bits),
            user_score: self.user_score.map(canonical_bits),
            rating: self.rating.as_deref(),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub(crate) struct RowKey<'a> {
    name: &'a str,
    platform: &'a str,
    release_year: Option<i32>,
    genre: &'a str,
    sales: [u64; 4],
    critic_score: Option<u64>,
    user_score: Option<u64>,
    rating: Option<&'a str>,
}

// -0.0 and 0.0 compare equal, so they must hash equal too
fn canonical_bits(value: f64) -> u64 {
    (value + 0.0).to_bits()
}

/// Numeric column of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    NaSales,
    EuSales,
    JpSales,
    OtherSales,
    TotalSales,
    CriticScore,
    UserScore,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::NaSales,
        Column::EuSales,
        Column::JpSales,
        Column::OtherSales,
        Column::TotalSales,
        Column::CriticScore,
        Column::UserScore,
    ];

    /// Value of this column for a record; `None` when the field is missing.
    #[must_use]
    pub fn value(self, record: &Record) -> Option<f64> {
        match self {
            Column::NaSales => Some(record.sales.get(Region::Na)),
            Column::EuSales => Some(record.sales.get(Region::Eu)),
            Column::JpSales => Some(record.sales.get(Region::Jp)),
            Column::OtherSales => Some(record.sales.get(Region::Other)),
            Column::TotalSales => Some(record.total_sales()),
            Column::CriticScore => record.critic_score,
            Column::UserScore => record.user_score,
        }
    }

    #[must_use]
    pub fn to_str(self) -> &'static str {
        match self {
            Column::NaSales => "na_sales",
            Column::EuSales => "eu_sales",
            Column::JpSales => "jp_sales",
            Column::OtherSales => "other_sales",
            Column::TotalSales => "total_sales",
            Column::CriticScore => "critic_score",
            Column::UserScore => "user_score",
        }
    }
}

impl From<Region> for Column {
    fn from(region: Region) -> Self {
        match region {
            Region::Na => Column::NaSales,
            Region::Eu => Column::EuSales,
            Region::Jp => Column::JpSales,
            Region::Other => Column::OtherSales,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.to_str(), f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("unknown {kind} '{value}'")]
pub struct ParseNameError {
    kind: &'static str,
    value: String,
}

impl FromStr for Column {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        // `sum_sales` is accepted as an alias of the derived total
        if key == "sum_sales" {
            return Ok(Column::TotalSales);
        }
        Column::ALL
            .into_iter()
            .find(|column| column.to_str() == key)
            .ok_or_else(|| ParseNameError {
                kind: "column",
                value: s.to_owned(),
            })
    }
}

/// Categorical dimension used for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Platform,
    Genre,
    Rating,
    Year,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Platform,
        Dimension::Genre,
        Dimension::Rating,
        Dimension::Year,
    ];

    /// Group key for a record.
    ///
    /// Records without a rating share the empty key. Records with an unknown
    /// year have no year key and drop out of year groupings.
    #[must_use]
    pub fn key(self, record: &Record) -> Option<String> {
        match self {
            Dimension::Platform => Some(record.platform.clone()),
            Dimension::Genre => Some(record.genre.clone()),
            Dimension::Rating => Some(record.rating.clone().unwrap_or_default()),
            Dimension::Year => record.release_year.map(|year| year.to_string()),
        }
    }

    #[must_use]
    pub fn to_str(self) -> &'static str {
        match self {
            Dimension::Platform => "platform",
            Dimension::Genre => "genre",
            Dimension::Rating => "rating",
            Dimension::Year => "year",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.to_str(), f)
    }
}

impl FromStr for Dimension {
    type Err = ParseNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        if key == "year_of_release" {
            return Ok(Dimension::Year);
        }
        Dimension::ALL
            .into_iter()
            .find(|dimension| dimension.to_str() == key)
            .ok_or_else(|| ParseNameError {
                kind: "dimension",
                value: s.to_owned(),
            })
    }
}
