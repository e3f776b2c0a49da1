//! Refresh command - replace the dataset once.

use std::path::PathBuf;
use std::time::Duration;

use benchfinder::refresh::{FileDatasetSource, RefreshOutcome, DEFAULT_REFRESH_DEADLINE_SECS};
use benchfinder::store::deadline_token;
use console::style;
use tracing::warn;

use super::common::{cancel_on_ctrl_c, describe_outcome};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the refresh command.
pub struct RefreshArgs {
    pub file: Option<PathBuf>,
    pub url: Option<String>,
}

/// Run the refresh command.
pub fn run(args: RefreshArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(false)?;
    runner.log_startup("refresh");

    let mut config = runner.app_config();
    if let Some(url) = args.url {
        config = config.with_dataset_url(url);
    }

    let origin = match &args.file {
        Some(path) => path.display().to_string(),
        None => config.dataset_url.clone(),
    };
    println!("Refreshing benches from {}", style(&origin).cyan());

    let app = runner.start_app(config)?;

    let outcome = runner.block_on(async {
        let cancel = deadline_token(
            &app.shutdown_token(),
            Duration::from_secs(DEFAULT_REFRESH_DEADLINE_SECS),
        );
        cancel_on_ctrl_c(cancel.clone());

        let outcome = match args.file {
            Some(path) => app.refresh_from(FileDatasetSource::new(path), &cancel).await,
            None => app.refresh(&cancel).await,
        };
        cancel.cancel();
        outcome
    })?;

    if let RefreshOutcome::Replaced(summary) = &outcome {
        if let Some(error) = &summary.cleanup_error {
            warn!(error = %error, "Old dataset could not be removed");
        }
        runner.block_on(app.shutdown())?;
    }

    println!("{} {}", style("✓").green().bold(), describe_outcome(&outcome));
    Ok(())
}
