//! Prediction and strategy commands

use anyhow::{Context, Result};
use serde_json::Value;

use crate::client::{ApiClient, PredictResponse, StrategyAdvice};
use crate::output::{color_confidence, format_lap_time, print_success, OutputFormat};

/// Read one JSON document from a file path
fn read_json_input(path: &str) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path))?;
    serde_json::from_str(&raw).with_context(|| format!("Input file {} is not valid JSON", path))
}

/// Predict a lap time for the observation in the input file
pub async fn predict_lap_time(client: &ApiClient, input: &str, format: OutputFormat) -> Result<()> {
    let observation = read_json_input(input)?;
    let response: PredictResponse = client.post("api/predict", &observation).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Table => {
            print_success(&format!(
                "Predicted lap time: {} ({:.3}s)",
                format_lap_time(response.predicted_lap_time_seconds),
                response.predicted_lap_time_seconds
            ));
        }
    }

    Ok(())
}

/// Request pit-strategy advice for the race situation in the input file
pub async fn request_strategy(client: &ApiClient, input: &str, format: OutputFormat) -> Result<()> {
    let situation = read_json_input(input)?;
    let advice: StrategyAdvice = client.post("api/strategy", &situation).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&advice)?);
        }
        OutputFormat::Table => {
            println!("Recommendation: {}", advice.recommendation);
            println!("Reasoning:      {}", advice.reasoning);
            println!("Confidence:     {}", color_confidence(&advice.confidence));
        }
    }

    Ok(())
}
