use clap::{Parser, Subcommand};

use crate::logging;

use self::{report::ReportArg, segment::SegmentArg, top::TopArg, ttest::TtestArg};

mod dataset;
mod report;
mod segment;
mod top;
mod ttest;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What to compute
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the full analysis and print the report
    Report(#[clap(flatten)] ReportArg),
    /// Compare scores of two segments with Welch's t-test
    Ttest(#[clap(flatten)] TtestArg),
    /// Summarize a column over one segment
    Segment(#[clap(flatten)] SegmentArg),
    /// Rank groups by summed sales
    Top(#[clap(flatten)] TopArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    logging::init_tracing("info")?;
    match args.mode {
        Mode::Report(arg) => report::run(&arg)?,
        Mode::Ttest(arg) => ttest::run(&arg)?,
        Mode::Segment(arg) => segment::run(&arg)?,
        Mode::Top(arg) => top::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_ttest() {
        let args = CommandArgs::try_parse_from([
            "vgsales",
            "ttest",
            "games.csv",
            "--a",
            "platform=XOne",
            "--b",
            "platform=PC",
            "--alpha",
            "0.01",
        ])
        .unwrap();
        let Mode::Ttest(arg) = args.mode else {
            panic!("expected ttest");
        };
        assert_eq!(arg.dataset.config.alpha, Some(0.01));
        assert_eq!(arg.a.len(), 1);
    }
}
