//! Serve command - keep the dataset fresh and answer queries on stdin.
//!
//! Each input line is `lat,lon`; the answer is one line per bench followed
//! by an empty line.

use benchfinder::query::NearbyFinder;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::common::{describe_bench, parse_coordinates};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the serve command.
pub fn run() -> Result<(), CliError> {
    let runner = CliRunner::new(false)?;
    runner.log_startup("serve");

    let mut app = runner.start_app(runner.app_config())?;
    app.start_scheduler();

    eprintln!("BenchFinder v{} ready", benchfinder::VERSION);
    eprintln!("Type `lat,lon` and press Enter. Ctrl+C or Ctrl+D to exit.");

    let shutdown = app.shutdown_token();
    let finder = app.finder().clone();
    let served = runner.block_on(answer_queries(finder, shutdown));

    let stats = runner.block_on(app.shutdown())?;
    if let Some(stats) = stats {
        info!(runs = stats.runs, replaced = stats.replaced, "Serve finished");
    }
    served
}

async fn answer_queries(
    finder: NearbyFinder,
    shutdown: CancellationToken,
) -> Result<(), CliError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = tokio::select! {
            biased;

            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let answer = answer(&finder, line, &shutdown).await;
        stdout.write_all(answer.as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}

async fn answer(finder: &NearbyFinder, line: &str, cancel: &CancellationToken) -> String {
    let Some((lat, lon)) = parse_coordinates(line) else {
        return "error: expected `lat,lon`\n\n".to_string();
    };

    match finder.find(lat, lon, cancel).await {
        Ok(result) if result.is_empty() => {
            format!("no benches within {} m\n\n", finder.radius_m())
        }
        Ok(result) => {
            let mut out = String::new();
            for bench in &result.benches {
                out.push_str(&describe_bench(bench));
                out.push('\n');
            }
            out.push('\n');
            out
        }
        Err(e) => format!("error: {}\n\n", e),
    }
}
