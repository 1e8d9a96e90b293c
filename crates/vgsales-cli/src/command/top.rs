use std::io::{self, Write};

use clap::Args;
use serde::Serialize;
use vgsales_analysis::{
    aggregate::{self, GroupTotal},
    record::{Column, Dimension},
};

use crate::{
    command::dataset::DatasetArg,
    util::{self, OutputArg},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct TopArg {
    #[command(flatten)]
    pub dataset: DatasetArg,

    /// Grouping: platform, genre, rating or year
    #[arg(long)]
    pub by: Dimension,

    /// Column to sum per group
    #[arg(long, default_value = "total_sales")]
    pub column: Column,

    /// Number of groups to show
    #[arg(short, long, default_value_t = 5)]
    pub n: usize,

    /// Show the groups with the smallest sums instead
    #[arg(long)]
    pub bottom: bool,

    /// Use the normalized table without outlier removal or year window
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub output: OutputArg,
}

#[derive(Debug, Clone, Serialize)]
struct Ranking {
    by: Dimension,
    column: Column,
    bottom: bool,
    groups: Vec<GroupTotal>,
}

pub(crate) fn run(arg: &TopArg) -> anyhow::Result<()> {
    let (table, _config) = arg.dataset.load_filtered(arg.raw)?;
    let segment = table.segment();
    let groups = if arg.bottom {
        aggregate::bottom_n(&segment, arg.by, arg.column, arg.n)
    } else {
        aggregate::top_n(&segment, arg.by, arg.column, arg.n)
    };
    let ranking = Ranking {
        by: arg.by,
        column: arg.column,
        bottom: arg.bottom,
        groups,
    };
    arg.output.emit(&ranking, |out, ranking| print_ranking(out, ranking))
}

fn print_ranking(out: &mut dyn Write, ranking: &Ranking) -> io::Result<()> {
    writeln!(
        out,
        "{} {} by {} ({})",
        if ranking.bottom { "Bottom" } else { "Top" },
        ranking.groups.len(),
        ranking.by,
        ranking.column
    )?;
    print_groups(out, ranking.by.to_str(), &ranking.groups)
}

pub(crate) fn print_groups(
    out: &mut dyn Write,
    label: &str,
    groups: &[GroupTotal],
) -> io::Result<()> {
    writeln!(out, "  {:>4} {:<20} {:>12}", "#", label, "Sales")?;
    writeln!(out, "  {}", "-".repeat(38))?;
    for (i, group) in groups.iter().enumerate() {
        writeln!(
            out,
            "  {:>4} {:<20} {:>12.2}",
            i + 1,
            util::group_label(&group.key),
            group.value
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_ranking() {
        let ranking = Ranking {
            by: Dimension::Rating,
            column: Column::NaSales,
            bottom: false,
            groups: vec![
                GroupTotal {
                    key: "M".to_owned(),
                    value: 12.5,
                },
                GroupTotal {
                    key: String::new(),
                    value: 3.0,
                },
            ],
        };
        let mut buf = Vec::new();
        print_ranking(&mut buf, &ranking).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Top 2 by rating (na_sales)"));
        assert!(text.contains("(none)"));
        assert!(text.contains("12.50"));
    }
}
