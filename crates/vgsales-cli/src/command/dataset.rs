//! Dataset and configuration arguments shared by all commands

use std::path::PathBuf;

use clap::Args;
use vgsales_analysis::{
    config::AnalysisConfig,
    filter::{self, YearWindow},
    table::GameTable,
};

use crate::util;

#[derive(Debug, Clone, Args)]
pub(crate) struct DatasetArg {
    /// Path to the sales CSV file
    pub csv: PathBuf,

    #[command(flatten)]
    pub config: ConfigArg,
}

impl DatasetArg {
    /// Loads the dataset and resolves the configuration.
    pub fn load(&self) -> anyhow::Result<(GameTable, AnalysisConfig)> {
        let config = self.config.resolve()?;
        let table = util::read_dataset(&self.csv)?;
        Ok((table, config))
    }

    /// Loads the dataset with outliers removed and restricted to the year
    /// window, or only normalized when `raw` is set.
    pub fn load_filtered(&self, raw: bool) -> anyhow::Result<(GameTable, AnalysisConfig)> {
        let (table, config) = self.load()?;
        if raw {
            return Ok((table, config));
        }
        let table = filter::remove_outliers(table, config.outlier_threshold);
        let table = filter::restrict_window(table, config.window);
        tracing::info!(rows = table.len(), "filtered dataset");
        Ok((table, config))
    }
}

#[derive(Debug, Clone, Default, Args)]
pub(crate) struct ConfigArg {
    /// JSON file with analysis settings; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Significance level of hypothesis tests
    #[arg(long)]
    pub alpha: Option<f64>,

    /// Rows with total sales at or above this are dropped as outliers
    #[arg(long)]
    pub outlier_threshold: Option<f64>,

    /// Keep years strictly after this one
    #[arg(long)]
    pub window_after: Option<i32>,

    /// Keep years strictly before this one
    #[arg(long)]
    pub window_before: Option<i32>,

    /// Most recent (incomplete) year, summarized separately
    #[arg(long)]
    pub snapshot_year: Option<i32>,
}

impl ConfigArg {
    pub fn resolve(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => util::read_json_file::<AnalysisConfig, _>("config", path)?,
            None => AnalysisConfig::default(),
        };
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(threshold) = self.outlier_threshold {
            config.outlier_threshold = threshold;
        }
        config.window = YearWindow::new(
            self.window_after.unwrap_or(config.window.after),
            self.window_before.unwrap_or(config.window.before),
        );
        if let Some(year) = self.snapshot_year {
            config.snapshot_year = year;
        }

        if !(config.alpha > 0.0 && config.alpha < 1.0) {
            anyhow::bail!("alpha must lie in (0, 1), got {}", config.alpha);
        }
        if config.window.after >= config.window.before {
            anyhow::bail!(
                "empty year window: {} < year < {}",
                config.window.after,
                config.window.before
            );
        }
        tracing::debug!(?config, "resolved configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let arg = ConfigArg {
            alpha: Some(0.01),
            window_after: Some(2005),
            ..ConfigArg::default()
        };
        let config = arg.resolve().unwrap();
        assert_eq!(config.alpha, 0.01);
        assert_eq!(config.window, YearWindow::new(2005, 2016));
        assert_eq!(config.snapshot_year, 2016);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let arg = ConfigArg {
            alpha: Some(1.5),
            ..ConfigArg::default()
        };
        assert!(arg.resolve().is_err());

        let arg = ConfigArg {
            window_after: Some(2016),
            ..ConfigArg::default()
        };
        assert!(arg.resolve().is_err());
    }
}
