use anyhow::Context;
use tracing_subscriber::EnvFilter;

use awj_optimizer::OptimizationRequest;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .nth(1)
        .context("usage: awj-optimize <request.json>")?;

    let request = OptimizationRequest::from_json_file(&path)
        .with_context(|| format!("failed to load request from {path}"))?;
    let recommendation = request.run().context("optimization failed")?;

    tracing::info!(
        "Recommended P={:.2} MPa, mf={:.3} kg/min, v={:.2} mm/min ({})",
        recommendation.pressure,
        recommendation.flow_rate,
        recommendation.traverse_rate,
        recommendation.result.termination
    );
    println!("{}", serde_json::to_string_pretty(&recommendation)?);
    Ok(())
}
