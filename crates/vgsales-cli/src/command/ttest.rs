use std::io::{self, Write};

use clap::Args;
use vgsales_analysis::{
    hypothesis::{HypothesisOutcome, HypothesisTest, ScoreKind},
    segment::Predicate,
};

use crate::{command::dataset::DatasetArg, util::OutputArg};

#[derive(Debug, Clone, Args)]
pub(crate) struct TtestArg {
    #[command(flatten)]
    pub dataset: DatasetArg,

    /// Predicate selecting segment A, e.g. `platform=XOne` (repeat to combine)
    #[arg(long = "a", required = true)]
    pub a: Vec<Predicate>,

    /// Predicate selecting segment B (repeat to combine)
    #[arg(long = "b", required = true)]
    pub b: Vec<Predicate>,

    /// Score to compare
    #[arg(long, default_value = "user")]
    pub score: ScoreKind,

    /// Test on the normalized table without outlier removal or year window
    #[arg(long)]
    pub raw: bool,

    #[command(flatten)]
    pub output: OutputArg,
}

pub(crate) fn run(arg: &TtestArg) -> anyhow::Result<()> {
    let (table, config) = arg.dataset.load_filtered(arg.raw)?;
    let a = combine(&arg.a);
    let b = combine(&arg.b);
    let outcome =
        HypothesisTest::new(config.alpha).compare("ad_hoc", &table.segment(), &a, &b, arg.score)?;
    arg.output.emit(&outcome, |out, outcome| print_outcome(out, outcome))
}

fn combine(predicates: &[Predicate]) -> Predicate {
    match predicates {
        [single] => single.clone(),
        many => Predicate::And(many.to_vec()),
    }
}

pub(crate) fn print_outcome(out: &mut dyn Write, outcome: &HypothesisOutcome) -> io::Result<()> {
    let test = &outcome.test;
    writeln!(out, "Welch t-test: {} ({} score)", outcome.name, outcome.score)?;
    writeln!(out, "  A: {}", outcome.a)?;
    writeln!(out, "  B: {}", outcome.b)?;
    writeln!(
        out,
        "  {:<10} {:>8} {:>10} {:>12}",
        "Sample", "N", "Mean", "Variance"
    )?;
    writeln!(out, "  {}", "-".repeat(43))?;
    writeln!(
        out,
        "  {:<10} {:>8} {:>10.3} {:>12.4}",
        "A", test.n_a, test.mean_a, outcome.variance.variance_a
    )?;
    writeln!(
        out,
        "  {:<10} {:>8} {:>10.3} {:>12.4}",
        "B", test.n_b, test.mean_b, outcome.variance.variance_b
    )?;
    writeln!(
        out,
        "  Variances equal: {}",
        if outcome.variance.equal { "yes" } else { "no" }
    )?;
    writeln!(
        out,
        "  t = {:.4}, df = {:.2}, p = {:.6} (alpha = {})",
        test.t_statistic, test.degrees_of_freedom, test.p_value, outcome.alpha
    )?;
    writeln!(out, "  Verdict: {}", outcome.verdict)?;
    Ok(())
}
