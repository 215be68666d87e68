//! Output formatting for the `inspect` command
//!
//! Formatters for JSON, YAML and human-readable text. The machine formats
//! serialize the intent model as-is; the human format is a short tree view.
//!
//! # Example
//!
//! ```ignore
//! use cloudpack::cli::output::{OutputFormat, OutputFormatter};
//! use cloudpack::extractors::DeploymentIntent;
//!
//! let intent = DeploymentIntent::default();
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! println!("{}", formatter.format(&intent)?);
//! ```

use anyhow::{Context, Result};
use std::collections::BTreeMap;

use crate::config::GeneratorConfig;
use crate::extractors::{DeploymentIntent, ListenerInfo};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Output formatter for extracted intents
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats an intent according to the configured format
    pub fn format(&self, intent: &DeploymentIntent) -> Result<String> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_string_pretty(intent).context("Failed to serialize intent to JSON")
            }
            OutputFormat::Yaml => {
                serde_yaml::to_string(intent).context("Failed to serialize intent to YAML")
            }
            OutputFormat::Human => Ok(self.format_human(intent)),
        }
    }

    /// Formats configuration display
    pub fn format_config(&self, config: &GeneratorConfig) -> Result<String> {
        let config_map: BTreeMap<String, String> = config.to_display_map().into_iter().collect();
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config_map)
                .context("Failed to serialize config to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&config_map).context("Failed to serialize config to YAML")
            }
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_human(&self, intent: &DeploymentIntent) -> String {
        let mut output = String::new();

        if let Some(task) = &intent.task {
            output.push_str("\u{2713} Scheduled Task\n");
            output.push_str(RULE);
            output.push_str("\n\n");
            output.push_str(&format!("Schedule: {}\n", task.schedule()));
            return output;
        }

        if intent.is_empty() {
            output.push_str("\u{26A0} No listeners, services or tasks found\n");
            return output;
        }

        output.push_str("\u{2713} Deployment Intent\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str("Listeners:\n");
        if intent.listeners.is_empty() {
            output.push_str("\u{2514}\u{2500} (none declared)\n");
        }
        for (i, listener) in intent.listeners.iter().enumerate() {
            let connector = branch(i, intent.listeners.len());
            output.push_str(&format!("{}\u{2500} {}\n", connector, describe_listener(listener)));
        }
        output.push('\n');

        output.push_str("Services:\n");
        for (i, service) in intent.services.iter().enumerate() {
            let connector = branch(i, intent.services.len());
            output.push_str(&format!(
                "{}\u{2500} /{} on {}\n",
                connector,
                service.path.trim_start_matches('/'),
                describe_listener(&service.listener)
            ));
            for resource in &service.resources {
                output.push_str(&format!("     {} {}\n", resource.method, resource.path));
            }
        }

        if !intent.int_variables.is_empty() {
            output.push_str("\nVariables:\n");
            for (name, value) in &intent.int_variables {
                output.push_str(&format!("  {} = {}\n", name, value));
            }
        }

        output
    }
}

fn branch(index: usize, len: usize) -> &'static str {
    if index + 1 == len {
        "\u{2514}"
    } else {
        "\u{251C}"
    }
}

fn describe_listener(listener: &ListenerInfo) -> String {
    let port = match (listener.port, listener.port_ref.as_deref()) {
        (0, Some(reference)) => format!("port {}", reference),
        (0, None) => "unknown port".to_string(),
        (port, _) => format!("port {}", port),
    };
    let tls = if listener.config.is_some() { ", TLS" } else { "" };
    format!("{} ({}{})", listener.name, port, tls)
}
