//! Training command

use anyhow::Result;

use crate::client::{ApiClient, TrainRequest, TrainingOutcome};
use crate::output::{print_info, print_success, OutputFormat};

/// Train a model from one session of archived telemetry
pub async fn run_training(
    client: &ApiClient,
    year: u16,
    race: &str,
    session: &str,
    format: OutputFormat,
) -> Result<()> {
    print_info(&format!("Training from {} {} ({})", year, race, session));

    let request = TrainRequest {
        year,
        race: race.to_string(),
        session: session.to_string(),
    };
    let outcome: TrainingOutcome = client.post("api/train", &request).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Table => {
            print_success(&format!(
                "Model trained on {} laps ({} features, RMSE {:.3}s)",
                outcome.samples, outcome.feature_count, outcome.rmse
            ));
        }
    }

    Ok(())
}
