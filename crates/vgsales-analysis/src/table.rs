//! Owned record table
//!
//! A [`GameTable`] owns its records in source order. Every transformation
//! (normalization, outlier removal, window restriction) consumes or borrows a
//! table and produces a new one; [`Segment`]s borrow it read-only.

use std::{io::Read, path::Path};

use serde::Serialize;

use crate::{
    loader::{self, LoadError},
    normalize,
    record::Record,
    segment::{Predicate, Segment},
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GameTable {
    records: Vec<Record>,
}

impl GameTable {
    #[must_use]
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    /// Loads and normalizes the CSV at `path`.
    pub fn load<P>(path: P) -> Result<Self, LoadError>
    where
        P: AsRef<Path>,
    {
        let raw = loader::read_raw_records_from_path(path)?;
        let table = normalize::table_from_raw(&raw)?;
        tracing::info!(rows = table.len(), "dataset loaded");
        Ok(table)
    }

    /// Loads and normalizes CSV text from any reader.
    pub fn from_reader<R>(reader: R) -> Result<Self, LoadError>
    where
        R: Read,
    {
        normalize::table_from_raw(&loader::read_raw_records(reader)?)
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Segment covering every row.
    #[must_use]
    pub fn segment(&self) -> Segment<'_> {
        Segment::new(&self.records)
    }

    /// Segment of the rows matching `predicate`.
    #[must_use]
    pub fn matching(&self, predicate: &Predicate) -> Segment<'_> {
        self.segment().matching(predicate)
    }

    /// New table keeping the rows for which `f` holds.
    #[must_use]
    pub fn retain<F>(self, f: F) -> Self
    where
        F: Fn(&Record) -> bool,
    {
        self.records.into_iter().filter(|record| f(record)).collect()
    }
}

impl FromIterator<Record> for GameTable {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RegionalSales;

    #[test]
    fn test_from_reader_normalizes() {
        let csv = concat!(
            "Name,Platform,Year_of_Release,Genre,NA_sales,EU_sales,JP_sales,Other_sales,Critic_Score,User_Score,Rating\n",
            "Wii Sports,Wii,2006,Sports,41.36,28.96,3.77,8.45,76,8,E\n",
            "Wii Sports,Wii,2006,Sports,41.36,28.96,3.77,8.45,76,8,E\n",
            "Tetris,GB,,Puzzle,23.2,2.26,4.22,0.58,,tbd,\n",
        );
        let table = GameTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1].user_score, None);
    }

    #[test]
    fn test_retain_produces_new_table() {
        let sales = RegionalSales::new(1.0, 0.0, 0.0, 0.0);
        let table: GameTable = ["PS2", "PC", "PS2"]
            .into_iter()
            .map(|platform| Record::new("g", platform, Some(2005), "Action", sales))
            .collect();
        let ps2 = table.clone().retain(|r| r.platform == "PS2");
        assert_eq!(ps2.len(), 2);
        assert_eq!(table.len(), 3);
        assert_eq!(table.matching(&Predicate::platform("PC")).len(), 1);
    }
}
