use anyhow::{Context, Result};
use hourly_energy_model::{config, telemetry, HourlyModel, MeterTable};
use config::Config;
use std::fs;
use std::path::Path;
use telemetry::init_tracing;
use tracing::{info, warn};

fn read_table(path: &Path) -> Result<MeterTable> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading table {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing table {}", path.display()))
}

fn main() -> Result<()> {
    init_tracing();

    let cfg = Config::load()?;
    info!(settings = ?cfg.model, "loaded configuration");

    let baseline = read_table(&cfg.run.baseline_path)?;
    let mut model = HourlyModel::new(cfg.model.clone())?;
    model.fit(&baseline)?;

    if let Some(metrics) = model.baseline_metrics() {
        info!(%metrics, "baseline fit");
    }

    let record = model.to_record()?.to_json_pretty()?;
    fs::write(&cfg.run.model_path, record)
        .with_context(|| format!("writing model {}", cfg.run.model_path.display()))?;
    info!(path = %cfg.run.model_path.display(), "model written");

    match (&cfg.run.reporting_path, &cfg.run.predictions_path) {
        (Some(reporting_path), Some(predictions_path)) => {
            let reporting = read_table(reporting_path)?;
            let predictions = model.predict(&reporting)?;
            let missing = predictions.predicted.iter().filter(|p| p.is_none()).count();
            if missing > 0 {
                warn!(rows = missing, "reporting rows without a prediction");
            }
            fs::write(predictions_path, serde_json::to_string_pretty(&predictions)?)
                .with_context(|| format!("writing predictions {}", predictions_path.display()))?;
            info!(rows = predictions.len(), path = %predictions_path.display(), "predictions written");
        }
        (Some(_), None) => {
            anyhow::bail!("REPORTING_PATH is set but PREDICTIONS_PATH is not");
        }
        _ => {}
    }

    Ok(())
}
