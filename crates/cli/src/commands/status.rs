//! Service health and model listing commands

use anyhow::Result;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_status, format_timestamp, print_json, print_table, print_warning, OutputFormat,
};

/// Row for component health table
#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "Component")]
    name: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Message")]
    message: String,
}

/// Row for models table
#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Status")]
    status: String,
}

/// Show the service health report
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let health = client.health().await?;

    match format {
        OutputFormat::Json => print_json(&health)?,
        OutputFormat::Table => {
            println!("Status:        {}", color_status(health.status.as_str()));
            println!("Version:       {}", health.version);
            println!("Uptime:        {}s", health.uptime_seconds);
            println!("Models loaded: {}", health.models_loaded);
            println!("Checked at:    {}", format_timestamp(&health.timestamp));
            println!();

            let mut rows: Vec<ComponentRow> = health
                .components
                .iter()
                .map(|(name, component)| ComponentRow {
                    name: name.clone(),
                    status: color_status(component.status.as_str()),
                    message: component.message.clone().unwrap_or_else(|| "-".to_string()),
                })
                .collect();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            print_table(&rows, "No components reported");

            if health.models_loaded == 0 {
                print_warning("No models are loaded; predictions will be rejected");
            }
        }
    }

    Ok(())
}

/// List the registered models
pub async fn list_models(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let list = client.models().await?;

    match format {
        OutputFormat::Json => print_json(&list)?,
        OutputFormat::Table => {
            let rows: Vec<ModelRow> = list
                .models
                .iter()
                .map(|m| ModelRow {
                    name: m.name.clone(),
                    version: m.version.clone(),
                    status: color_status(&m.status),
                })
                .collect();
            print_table(&rows, "No models registered");
        }
    }

    Ok(())
}
