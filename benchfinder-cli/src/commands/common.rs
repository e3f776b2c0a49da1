//! Helpers shared across CLI commands.

use benchfinder::query::NearbyBench;
use benchfinder::refresh::RefreshOutcome;
use tokio_util::sync::CancellationToken;

/// Parse a `lat,lon` pair as typed on stdin.
pub fn parse_coordinates(line: &str) -> Option<(f64, f64)> {
    let (lat, lon) = line.split_once(',')?;
    let lat = lat.trim().parse().ok()?;
    let lon = lon.trim().parse().ok()?;
    Some((lat, lon))
}

/// One line describing a nearby bench.
pub fn describe_bench(nearby: &NearbyBench) -> String {
    let bench = &nearby.bench;
    let street = [bench.street_name.as_str(), bench.street_number.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let mut place = if street.is_empty() {
        bench.description.clone()
    } else {
        street
    };
    if !bench.neighborhood_name.is_empty() {
        if place.is_empty() {
            place = bench.neighborhood_name.clone();
        } else {
            place = format!("{}, {}", place, bench.neighborhood_name);
        }
    }

    if place.is_empty() {
        format!("{:>6.0} m  {}", nearby.distance_m, bench.gis_id)
    } else {
        format!("{:>6.0} m  {}  {}", nearby.distance_m, bench.gis_id, place)
    }
}

/// Human-readable summary of a refresh.
pub fn describe_outcome(outcome: &RefreshOutcome) -> String {
    match outcome {
        RefreshOutcome::Replaced(summary) => format!(
            "Loaded {} benches (generation {}) in {:.1}s",
            summary.record_count,
            summary.generation,
            summary.duration.as_secs_f64()
        ),
        RefreshOutcome::SkippedEmpty => "Feed was empty; kept the current dataset".to_string(),
        RefreshOutcome::Unchanged { .. } => "Feed unchanged since the last refresh".to_string(),
    }
}

/// Cancel `token` when Ctrl+C is pressed.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
}
