use tracing::info;

use nightgrid::replay::{self, Scenario};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("NIGHTGRID_SCENARIO").ok())
        .ok_or("usage: nightgrid-replay <scenario.json> (or set NIGHTGRID_SCENARIO)")?;
    let pretty: bool = std::env::var("NIGHTGRID_PRETTY")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(true);

    let raw = std::fs::read_to_string(&path)?;
    let scenario: Scenario = serde_json::from_str(&raw)?;
    info!("replaying {path}");
    info!("  rooms: {}", scenario.rooms.len());
    info!("  range: {} .. {}", scenario.start, scenario.end);
    info!("  steps: {}", scenario.steps.len());

    let report = replay::run(scenario).await?;
    let rejected = report.steps.iter().filter(|s| !s.ok).count();
    info!(
        committed = report.committed.len(),
        rejected, "replay finished"
    );

    let out = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{out}");
    Ok(())
}
