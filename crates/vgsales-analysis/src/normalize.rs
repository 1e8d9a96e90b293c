//! Type coercion and table normalization
//!
//! Turns [`RawRecord`]s into typed [`Record`]s and brings a table into its
//! canonical form:
//!
//! - sales fields parse as non-negative decimals, or the load fails
//! - scores parse as decimals within their scale; anything else (including
//!   the `tbd` placeholder) becomes missing, never zero
//! - years parse as four-digit integers (`2006.0` is accepted); anything else
//!   becomes unknown
//! - blank ratings become `None`
//! - the total is derived from the regional sales on every row
//! - exact duplicate rows are collapsed, keeping the first occurrence
//!
//! [`normalize`] is idempotent: a normalized table passes through unchanged.

use std::collections::HashSet;

use crate::{
    loader::{LoadError, RawRecord},
    record::{RegionalSales, Record},
    table::GameTable,
};

/// Upper bound of the critic score scale.
pub const CRITIC_SCORE_MAX: f64 = 100.0;
/// Upper bound of the user score scale.
pub const USER_SCORE_MAX: f64 = 10.0;
/// Placeholder the source uses for a user score that is "to be determined".
pub const TBD_TOKEN: &str = "tbd";

const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1000..=9999;

/// Coerces one raw row into a typed record.
///
/// Only the sales fields can fail; every other field falls back to missing.
pub fn coerce(raw: &RawRecord) -> Result<Record, LoadError> {
    let sales = RegionalSales::new(
        parse_sales(raw.line, "na_sales", &raw.na_sales)?,
        parse_sales(raw.line, "eu_sales", &raw.eu_sales)?,
        parse_sales(raw.line, "jp_sales", &raw.jp_sales)?,
        parse_sales(raw.line, "other_sales", &raw.other_sales)?,
    );

    Ok(Record {
        name: raw.name.clone().unwrap_or_default(),
        platform: raw.platform.clone().unwrap_or_default(),
        release_year: raw.year_of_release.as_deref().and_then(parse_year),
        genre: raw.genre.clone().unwrap_or_default(),
        sales,
        critic_score: raw
            .critic_score
            .as_deref()
            .and_then(|text| parse_score(text, CRITIC_SCORE_MAX)),
        user_score: raw
            .user_score
            .as_deref()
            .and_then(|text| parse_score(text, USER_SCORE_MAX)),
        rating: raw.rating.as_deref().and_then(parse_rating),
    })
}

/// Coerces and normalizes a full set of raw rows.
pub fn table_from_raw(raw: &[RawRecord]) -> Result<GameTable, LoadError> {
    let records = raw.iter().map(coerce).collect::<Result<Vec<_>, _>>()?;
    Ok(normalize(GameTable::new(records)))
}

/// Brings a table into canonical form.
#[must_use]
pub fn normalize(table: GameTable) -> GameTable {
    let before = table.len();
    let records = table
        .into_records()
        .into_iter()
        .map(normalize_record)
        .collect::<Vec<_>>();
    let records = dedup(records);
    tracing::debug!(
        rows = records.len(),
        duplicates = before - records.len(),
        "normalized table"
    );
    GameTable::new(records)
}

/// Removes exact duplicate rows, keeping the first occurrence of each.
#[must_use]
pub fn dedup(records: Vec<Record>) -> Vec<Record> {
    let keep = {
        let mut seen = HashSet::with_capacity(records.len());
        records
            .iter()
            .map(|record| seen.insert(record.row_key()))
            .collect::<Vec<_>>()
    };
    records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect()
}

fn normalize_record(mut record: Record) -> Record {
    record.sales = record.sales.recomputed();
    record.release_year = record.release_year.filter(|year| YEAR_RANGE.contains(year));
    record.critic_score = record
        .critic_score
        .filter(|score| in_scale(*score, CRITIC_SCORE_MAX));
    record.user_score = record
        .user_score
        .filter(|score| in_scale(*score, USER_SCORE_MAX));
    record.rating = record.rating.as_deref().and_then(parse_rating);
    record
}

fn parse_sales(line: u64, column: &'static str, text: &str) -> Result<f64, LoadError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .ok_or_else(|| LoadError::InvalidSales {
            line,
            column,
            value: text.to_owned(),
        })
}

#[expect(clippy::cast_possible_truncation)]
fn parse_year(text: &str) -> Option<i32> {
    let value = text.trim().parse::<f64>().ok()?;
    if value.fract() != 0.0 || !value.is_finite() {
        tracing::trace!(value = text, "unparseable year treated as unknown");
        return None;
    }
    let year = value as i32;
    YEAR_RANGE.contains(&year).then_some(year)
}

fn parse_score(text: &str, max: f64) -> Option<f64> {
    let text = text.trim();
    if text.eq_ignore_ascii_case(TBD_TOKEN) {
        return None;
    }
    let score = text.parse::<f64>().ok();
    if score.is_none() {
        tracing::trace!(value = text, "non-numeric score treated as missing");
    }
    score.filter(|score| in_scale(*score, max))
}

fn parse_rating(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

fn in_scale(score: f64, max: f64) -> bool {
    (0.0..=max).contains(&score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{loader::read_raw_records, record::Region};

    const HEADER: &str = "name,platform,year_of_release,genre,na_sales,eu_sales,jp_sales,other_sales,critic_score,user_score,rating\n";

    fn load(rows: &str) -> Result<GameTable, LoadError> {
        let csv = format!("{HEADER}{rows}");
        table_from_raw(&read_raw_records(csv.as_bytes())?)
    }

    #[test]
    fn test_score_coercion() {
        let table = load(concat!(
            "A,PS2,2005,Action,1,0,0,0,80,tbd,T\n",
            "B,PS2,2005,Action,1,0,0,0,,0,\n",
            "C,PS2,2005,Action,1,0,0,0,101,8.5,E\n",
            "D,PS2,2005,Action,1,0,0,0,55,n/a,M\n",
        ))
        .unwrap();
        let records = table.records();
        assert_eq!(records[0].user_score, None);
        assert_eq!(records[0].critic_score, Some(80.0));
        assert_eq!(records[1].user_score, Some(0.0));
        assert_eq!(records[1].critic_score, None);
        assert_eq!(records[1].rating, None);
        assert_eq!(records[2].critic_score, None);
        assert_eq!(records[2].user_score, Some(8.5));
        assert_eq!(records[3].user_score, None);
        assert_eq!(records[3].rating.as_deref(), Some("M"));
    }

    #[test]
    fn test_year_resolution() {
        let table = load(concat!(
            "A,PS2,2006.0,Action,1,0,0,0,,,\n",
            "B,PS2,,Action,1,0,0,0,,,\n",
            "C,PS2,unknown,Action,1,0,0,0,,,\n",
            "D,PS2,06,Action,1,0,0,0,,,\n",
        ))
        .unwrap();
        let years = table
            .records()
            .iter()
            .map(|r| r.release_year)
            .collect::<Vec<_>>();
        assert_eq!(years, [Some(2006), None, None, None]);
    }

    #[test]
    fn test_total_equals_regional_sum() {
        let table = load(concat!(
            "A,PS2,2005,Action,0.1,0.2,0.3,0.4,,,\n",
            "B,X360,2010,Shooter,5.5,3.25,0.01,1.1,,,\n",
        ))
        .unwrap();
        for record in table.records() {
            let sum = Region::ALL
                .iter()
                .map(|region| record.sales.get(*region))
                .sum::<f64>();
            assert!((record.total_sales() - sum).abs() < 1e-9);
        }
    }

    #[test]
    fn test_invalid_sales_fails_load() {
        let err = load("A,PS2,2005,Action,1,abc,0,0,,,\n").unwrap_err();
        assert!(matches!(
            err,
            LoadError::InvalidSales {
                line: 2,
                column: "eu_sales",
                ..
            }
        ));
        let err = load("A,PS2,2005,Action,-1,0,0,0,,,\n").unwrap_err();
        assert!(matches!(err, LoadError::InvalidSales { .. }));
    }

    #[test]
    fn test_duplicates_collapsed_in_order() {
        let table = load(concat!(
            "A,PS2,2005,Action,1,0,0,0,70,7,T\n",
            "B,PS2,2005,Action,2,0,0,0,70,7,T\n",
            "A,PS2,2005,Action,1,0,0,0,70,7,T\n",
            "A,PS3,2005,Action,1,0,0,0,70,7,T\n",
        ))
        .unwrap();
        let names = table
            .records()
            .iter()
            .map(|r| format!("{}/{}", r.name, r.platform))
            .collect::<Vec<_>>();
        assert_eq!(names, ["A/PS2", "B/PS2", "A/PS3"]);

        let twice = dedup(table.records().to_vec());
        assert_eq!(twice.len(), table.len());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = load(concat!(
            "A,PS2,2005,Action,1,0.5,0,0,70,tbd,T\n",
            "A,PS2,2005,Action,1,0.5,0,0,70,tbd,T\n",
            "B,Wii,,Sports,2,1,0.25,0,,0,\n",
        ))
        .unwrap();
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_repairs_hand_built_records() {
        let sales = RegionalSales::new(1.0, 1.0, 0.0, 0.0);
        let mut record = Record::new("A", "PC", Some(42), "Misc", sales)
            .with_scores(Some(120.0), Some(-1.0));
        record.rating = Some("  ".to_owned());
        let table = normalize(GameTable::new(vec![record]));
        let record = &table.records()[0];
        assert_eq!(record.release_year, None);
        assert_eq!(record.critic_score, None);
        assert_eq!(record.user_score, None);
        assert_eq!(record.rating, None);
        assert_eq!(record.total_sales(), 2.0);
    }
}
