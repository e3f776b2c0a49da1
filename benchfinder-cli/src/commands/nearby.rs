//! Nearby command - list benches around a coordinate.

use benchfinder::query::NearbyBenches;
use console::style;
use tokio_util::sync::CancellationToken;

use super::common::describe_bench;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the nearby command.
pub struct NearbyArgs {
    pub lat: f64,
    pub lon: f64,
    pub radius: Option<f64>,
}

/// Run the nearby command.
pub fn run(args: NearbyArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(false)?;
    runner.log_startup("nearby");

    let mut config = runner.app_config();
    if let Some(radius) = args.radius {
        config = config.with_search_radius(radius);
    }
    let radius = config.search_radius_m;

    let app = runner.start_app(config)?;
    let cancel = CancellationToken::new();
    let result = runner.block_on(app.finder().find(args.lat, args.lon, &cancel))?;

    for line in render(&result, radius) {
        println!("{}", line);
    }
    Ok(())
}

fn render(result: &NearbyBenches, radius: f64) -> Vec<String> {
    if result.generation.is_none() {
        return vec![
            "No dataset loaded yet.".to_string(),
            format!("Run {} first.", style("benchfinder refresh").bold()),
        ];
    }

    if result.is_empty() {
        return vec![format!("No benches within {} m.", radius)];
    }

    let mut lines = vec![format!(
        "{} within {} m:",
        style(format!("{} benches", result.len())).green().bold(),
        radius
    )];
    lines.extend(result.benches.iter().map(describe_bench));

    if !result.unresolved.is_empty() {
        lines.push(format!(
            "{} {} indexed benches had no record: {}",
            style("!").yellow(),
            result.unresolved.len(),
            result.unresolved.join(", ")
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use benchfinder::bench::Bench;
    use benchfinder::query::NearbyBench;

    #[test]
    fn test_render_without_dataset() {
        let lines = render(&NearbyBenches::default(), 250.0);
        assert_eq!(lines[0], "No dataset loaded yet.");
    }

    #[test]
    fn test_render_empty_result() {
        let result = NearbyBenches {
            generation: Some(3),
            ..NearbyBenches::default()
        };
        assert_eq!(render(&result, 250.0), vec!["No benches within 250 m."]);
    }

    #[test]
    fn test_render_lists_benches_and_unresolved() {
        let result = NearbyBenches {
            benches: vec![NearbyBench {
                bench: Bench::new("A1", 2.15, 41.38),
                distance_m: 12.0,
            }],
            unresolved: vec!["B2".to_string()],
            generation: Some(1),
        };

        let lines = render(&result, 250.0);
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("A1"));
        assert!(lines[2].contains("B2"));
    }
}
