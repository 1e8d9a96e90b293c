//! Full analysis report command
//!
//! Runs the whole pipeline and prints every section as text tables, or the
//! complete [`AnalysisReport`] as JSON.

use std::io::{self, Write};

use clap::Args;
use vgsales_analysis::{
    aggregate::{GenreScoreProfile, RegionalProfile, Share},
    report::{AnalysisReport, HypothesisEntry},
};
use vgsales_stats::{descriptive::DescriptiveStats, percentiles::BoxPlotSummary};

use crate::{
    command::{dataset::DatasetArg, top::print_groups, ttest::print_outcome},
    util::{self, OutputArg},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct ReportArg {
    #[command(flatten)]
    pub dataset: DatasetArg,

    #[command(flatten)]
    pub output: OutputArg,
}

pub(crate) fn run(arg: &ReportArg) -> anyhow::Result<()> {
    let (table, config) = arg.dataset.load()?;
    let report = AnalysisReport::build(&table, &config);
    arg.output.emit(&report, |out, report| print_report(out, report))
}

fn print_report(out: &mut dyn Write, report: &AnalysisReport) -> io::Result<()> {
    let config = &report.config;
    writeln!(out, "Video Game Sales Report")?;
    writeln!(out, "=======================")?;
    writeln!(out, "Generated: {}", report.generated_at.to_rfc3339())?;
    writeln!(
        out,
        "Rows: {} loaded, {} after outlier removal (>= {}), {} in window {} < year < {}",
        report.rows.loaded,
        report.rows.after_outliers,
        config.outlier_threshold,
        report.rows.in_window,
        config.window.after,
        config.window.before,
    )?;
    writeln!(out)?;

    section(out, "Releases per Year")?;
    writeln!(out, "  {:>6} {:>8}", "Year", "Games")?;
    writeln!(out, "  {}", "-".repeat(15))?;
    for year in &report.games_per_year {
        writeln!(out, "  {:>6} {:>8}", year.year, year.count)?;
    }
    writeln!(out)?;

    section(out, "Best-selling Platforms (all years)")?;
    print_groups(out, "Platform", &report.top_platforms)?;
    writeln!(out)?;
    writeln!(out, "  {:<10} {:>6} {:>6} {:>6}", "Platform", "First", "Last", "Years")?;
    writeln!(out, "  {}", "-".repeat(31))?;
    for span in &report.lifespans {
        writeln!(
            out,
            "  {:<10} {:>6} {:>6} {:>6}",
            span.platform,
            span.first_year,
            span.last_year,
            span.years()
        )?;
    }
    writeln!(out, "  Mean lifespan: {} years", util::fmt_opt(report.mean_lifespan, 1))?;
    writeln!(out)?;

    section(out, &format!("Snapshot {}", report.snapshot.year))?;
    writeln!(
        out,
        "  Active platforms: {}",
        report.snapshot.active_platforms.join(", ")
    )?;
    if report.snapshot.new_platforms.is_empty() {
        writeln!(out, "  No platforms new to the window")?;
    } else {
        writeln!(
            out,
            "  New since window: {}",
            report.snapshot.new_platforms.join(", ")
        )?;
    }
    writeln!(out)?;

    section(out, "Peak Year per Platform (window)")?;
    writeln!(out, "  {:<10} {:>6} {:>10}", "Platform", "Year", "Sales")?;
    writeln!(out, "  {}", "-".repeat(28))?;
    for (platform, years) in &report.platform_year_sales {
        if let Some((year, sales)) = years.iter().max_by(|a, b| a.1.total_cmp(b.1)) {
            writeln!(out, "  {platform:<10} {year:>6} {sales:>10.2}")?;
        }
    }
    writeln!(out)?;

    section(out, "Total Sales per Game (window)")?;
    print_descriptive(out, report.total_sales.as_ref())?;
    writeln!(out)?;
    print_box_header(out)?;
    if let Some(summary) = &report.box_plots.overall {
        print_box_row(out, "(all)", summary)?;
    }
    for plot in &report.box_plots.by_platform {
        print_box_row(out, &plot.platform, &plot.summary)?;
    }
    writeln!(out)?;

    section(out, "Correlations (window)")?;
    let matrix = &report.correlations;
    write!(out, "  {:<13}", "")?;
    for column in &matrix.columns {
        write!(out, " {:>12}", column.to_str())?;
    }
    writeln!(out)?;
    for (column, row) in matrix.columns.iter().zip(&matrix.values) {
        write!(out, "  {:<13}", column.to_str())?;
        for value in row {
            write!(out, " {:>12}", util::fmt_opt(*value, 3))?;
        }
        writeln!(out)?;
    }
    writeln!(out)?;

    section(out, "Most Profitable Genres")?;
    print_groups(out, "Genre", &report.top_genres)?;
    writeln!(out)?;
    section(out, "Least Profitable Genres")?;
    print_groups(out, "Genre", &report.bottom_genres)?;
    writeln!(out)?;

    for profile in &report.regions {
        print_region(out, profile)?;
        writeln!(out)?;
    }

    section(out, "Scores by Genre (window, positive scores only)")?;
    print_genre_scores(out, &report.genre_scores)?;
    writeln!(out)?;

    section(out, "Hypothesis Tests")?;
    for entry in &report.hypotheses {
        match entry {
            HypothesisEntry::Tested(outcome) => print_outcome(out, outcome)?,
            HypothesisEntry::Failed { name, error } => {
                writeln!(out, "Welch t-test: {name}")?;
                writeln!(out, "  not tested: {error}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn section(out: &mut dyn Write, title: &str) -> io::Result<()> {
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(title.len()))
}

fn print_descriptive(out: &mut dyn Write, stats: Option<&DescriptiveStats>) -> io::Result<()> {
    let Some(stats) = stats else {
        return writeln!(out, "  no data");
    };
    writeln!(
        out,
        "  count {}, sum {:.2}, mean {:.3}, median {:.3}, std {:.3}, min {:.2}, max {:.2}",
        stats.count, stats.sum, stats.mean, stats.median, stats.std_dev, stats.min, stats.max
    )
}

fn print_box_header(out: &mut dyn Write) -> io::Result<()> {
    writeln!(
        out,
        "  {:<10} {:>6} {:>8} {:>8} {:>8} {:>8} {:>8} {:>9}",
        "Platform", "Games", "Q1", "Median", "Q3", "IQR", "Whisker", "Outliers"
    )?;
    writeln!(out, "  {}", "-".repeat(72))
}

fn print_box_row(out: &mut dyn Write, label: &str, summary: &BoxPlotSummary) -> io::Result<()> {
    writeln!(
        out,
        "  {:<10} {:>6} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>8.3} {:>9}",
        label,
        summary.count,
        summary.q1,
        summary.median,
        summary.q3,
        summary.iqr,
        summary.upper_whisker,
        summary.outliers
    )
}

fn print_region(out: &mut dyn Write, profile: &RegionalProfile) -> io::Result<()> {
    section(
        out,
        &format!("Region {} (total {:.2})", profile.region, profile.total),
    )?;
    for (label, shares) in [
        ("Platform", &profile.platforms),
        ("Genre", &profile.genres),
        ("Rating", &profile.ratings),
    ] {
        print_shares(out, label, shares)?;
    }
    Ok(())
}

fn print_shares(out: &mut dyn Write, label: &str, shares: &[Share]) -> io::Result<()> {
    writeln!(out, "  {:<20} {:>10} {:>8}", label, "Sales", "Share")?;
    writeln!(out, "  {}", "-".repeat(40))?;
    for share in shares {
        writeln!(
            out,
            "  {:<20} {:>10.2} {:>7.1}%",
            util::group_label(&share.key),
            share.sales,
            share.share * 100.0
        )?;
    }
    Ok(())
}

fn print_genre_scores(out: &mut dyn Write, profiles: &[GenreScoreProfile]) -> io::Result<()> {
    writeln!(
        out,
        "  {:<14} {:>6} {:>8} {:>8} {:>6} {:>8} {:>8}",
        "Genre", "Users", "Mean", "Std", "Critic", "Mean", "Std"
    )?;
    writeln!(out, "  {}", "-".repeat(64))?;
    for profile in profiles {
        let cells = |stats: Option<&DescriptiveStats>| {
            (
                stats.map_or(0, |s| s.count),
                util::fmt_opt(stats.map(|s| s.mean), 2),
                util::fmt_opt(stats.map(|s| s.std_dev), 2),
            )
        };
        let (user_n, user_mean, user_std) = cells(profile.user.as_ref());
        let (critic_n, critic_mean, critic_std) = cells(profile.critic.as_ref());
        writeln!(
            out,
            "  {:<14} {:>6} {:>8} {:>8} {:>6} {:>8} {:>8}",
            util::group_label(&profile.genre),
            user_n,
            user_mean,
            user_std,
            critic_n,
            critic_mean,
            critic_std
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use vgsales_analysis::{config::AnalysisConfig, table::GameTable};

    use super::*;

    const CSV: &str = "\
Name,Platform,Year_of_Release,Genre,NA_sales,EU_sales,JP_sales,Other_sales,Critic_Score,User_Score,Rating
Halo 5,XOne,2015,Shooter,2.78,1.27,0.03,0.41,84,6.4,T
Forza 6,XOne,2015,Racing,0.88,0.6,0.02,0.13,87,7.9,E
Sunset,XOne,2014,Action,0.1,0.05,0,0.01,,tbd,
Quantum Break,XOne,2016,Action,0.54,0.43,0.01,0.08,77,6.8,M
Civilization V,PC,2010,Strategy,0.98,0.52,0,0.17,90,7.7,E10+
StarCraft II,PC,2010,Strategy,2.57,1.68,0,0.58,93,8.2,T
The Sims 3,PC,2009,Simulation,0.99,6.42,0,0.6,86,7.6,T
FIFA 14,PS3,2013,Sports,0.78,4.24,0.07,1.37,86,4.3,E
Wii Sports,Wii,2006,Sports,41.36,28.96,3.77,8.45,76,8,E
Madden 08,PS2,2007,Sports,1.9,0.1,0,0.3,84,7.5,E
";

    #[test]
    fn test_print_report_sections() {
        let table = GameTable::from_reader(CSV.as_bytes()).unwrap();
        let report = AnalysisReport::build(&table, &AnalysisConfig::default());
        let mut buf = Vec::new();
        print_report(&mut buf, &report).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.contains("Rows: 10 loaded, 9 after outlier removal"));
        assert!(text.contains("Active platforms: XOne"));
        assert!(text.contains("Region JP"));
        assert!(text.contains("Welch t-test: xone_vs_pc_user_score"));
        assert!(text.contains("not tested"));
    }
}
