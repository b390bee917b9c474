//! Server status command

use anyhow::Result;
use tabled::Tabled;

use crate::client::{ApiClient, HealthStatus, ServiceInfo};
use crate::output::{print_table, OutputFormat};

/// Row for the status table
#[derive(Tabled, serde::Serialize)]
struct StatusRow {
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Model Loaded")]
    model_loaded: String,
}

/// Show server and model status
pub async fn show_status(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let info: ServiceInfo = client.get("/").await?;
    let health: HealthStatus = client.get("healthz").await?;

    let rows = vec![StatusRow {
        service: info.service,
        version: info.version,
        status: health.status,
        model_loaded: if health.model_loaded { "yes" } else { "no" }.to_string(),
    }];
    print_table(&rows, format);

    Ok(())
}
