use std::io::{self, Write};

use clap::Args;
use serde::Serialize;
use vgsales_analysis::{
    aggregate,
    record::Column,
    segment::{Predicate, Segment},
};
use vgsales_stats::{descriptive::DescriptiveStats, percentiles::Percentiles};

use crate::{
    command::dataset::DatasetArg,
    util::{self, OutputArg},
};

const PERCENTILE_POINTS: [f64; 3] = [10.0, 50.0, 90.0];

#[derive(Debug, Clone, Args)]
pub(crate) struct SegmentArg {
    #[command(flatten)]
    pub dataset: DatasetArg,

    /// Row filter, e.g. `genre=Action` or `user_score>7` (repeat to combine)
    #[arg(long = "where", required = true)]
    pub predicates: Vec<Predicate>,

    /// Columns to summarize (comma-separated; all numeric columns by default)
    #[arg(long = "column", value_delimiter = ',')]
    pub columns: Vec<Column>,

    /// Use the normalized table without outlier removal or year window
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub output: OutputArg,
}

#[derive(Debug, Clone, Serialize)]
struct SegmentSummary {
    predicate: String,
    rows: usize,
    columns: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, Serialize)]
struct ColumnSummary {
    column: Column,
    stats: Option<DescriptiveStats>,
    percentiles: Option<Percentiles>,
}

impl SegmentSummary {
    fn new(predicate: &Predicate, segment: &Segment<'_>, columns: &[Column]) -> Self {
        let columns = columns
            .iter()
            .map(|column| {
                let values = segment.values(*column);
                let stats = aggregate::summary(segment, *column);
                let percentiles = stats
                    .as_ref()
                    .map(|_| Percentiles::new(&values, &PERCENTILE_POINTS));
                ColumnSummary {
                    column: *column,
                    stats,
                    percentiles,
                }
            })
            .collect();
        Self {
            predicate: predicate.to_string(),
            rows: segment.len(),
            columns,
        }
    }
}

pub(crate) fn run(arg: &SegmentArg) -> anyhow::Result<()> {
    let (table, _config) = arg.dataset.load_filtered(arg.raw)?;
    let predicate = match arg.predicates.as_slice() {
        [single] => single.clone(),
        many => Predicate::And(many.to_vec()),
    };
    let columns = if arg.columns.is_empty() {
        Column::ALL.to_vec()
    } else {
        arg.columns.clone()
    };

    let segment = table.matching(&predicate);
    tracing::info!(%predicate, rows = segment.len(), "segment selected");
    let summary = SegmentSummary::new(&predicate, &segment, &columns);
    arg.output.emit(&summary, |out, summary| print_summary(out, summary))
}

fn print_summary(out: &mut dyn Write, summary: &SegmentSummary) -> io::Result<()> {
    writeln!(out, "Segment: {}", summary.predicate)?;
    writeln!(out, "Rows: {}", summary.rows)?;
    writeln!(out)?;
    writeln!(
        out,
        "  {:<14} {:>7} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "Column", "Count", "Sum", "Mean", "Std", "Min", "P10", "Median", "P90"
    )?;
    writeln!(out, "  {}", "-".repeat(102))?;
    for ColumnSummary {
        column,
        stats,
        percentiles,
    } in &summary.columns
    {
        let Some(stats) = stats else {
            writeln!(out, "  {:<14} {:>7}", column.to_str(), 0)?;
            continue;
        };
        let at = |p| util::fmt_opt(percentiles.as_ref().and_then(|ps| ps.get(p)), 3);
        writeln!(
            out,
            "  {:<14} {:>7} {:>10.2} {:>10.3} {:>10.3} {:>10.3} {:>10} {:>10.3} {:>10}",
            column.to_str(),
            stats.count,
            stats.sum,
            stats.mean,
            stats.std_dev,
            stats.min,
            at(10.0),
            stats.median,
            at(90.0),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use vgsales_analysis::{
        record::{Record, RegionalSales},
        table::GameTable,
    };

    use super::*;

    #[test]
    fn test_summary_of_segment() {
        let table: GameTable = [("PS2", 1.0), ("PS2", 3.0), ("PC", 5.0)]
            .into_iter()
            .map(|(platform, na)| {
                Record::new("g", platform, Some(2005), "Action", RegionalSales::new(na, 0.0, 0.0, 0.0))
            })
            .collect();
        let predicate = Predicate::platform("PS2");
        let segment = table.matching(&predicate);
        let summary =
            SegmentSummary::new(&predicate, &segment, &[Column::NaSales, Column::UserScore]);
        assert_eq!(summary.rows, 2);
        let na = &summary.columns[0];
        assert_eq!(na.stats.as_ref().map(|s| s.mean), Some(2.0));
        assert_eq!(na.percentiles.as_ref().and_then(|p| p.get(90.0)), Some(2.8));
        assert!(summary.columns[1].stats.is_none());

        let mut buf = Vec::new();
        print_summary(&mut buf, &summary).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Segment: platform=PS2"));
        assert!(text.contains("user_score"));
    }
}
