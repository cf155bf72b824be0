//! CLI command definitions

use clap::Args;

/// Build every configured pipeline against the built-in steps
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to pipelines YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Send one call through a configured pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to pipelines YAML file
    #[arg(short, long)]
    pub file: String,

    /// Service type the pipeline belongs to (e.g. Consumer)
    #[arg(short = 't', long)]
    pub service_type: String,

    /// Pipeline name (empty selects the default pipeline)
    #[arg(short, long, default_value = "")]
    pub pipeline: String,

    /// Target service name
    #[arg(long, default_value = "demo")]
    pub service: String,

    /// Operation to invoke
    #[arg(long, default_value = "ping")]
    pub operation: String,

    /// JSON request arguments
    #[arg(long)]
    pub args: Option<String>,

    /// Call metadata (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub meta: Vec<(String, String)>,

    /// Output the final call context and response as JSON
    #[arg(long)]
    pub json: bool,
}

/// List the built-in steps
#[derive(Debug, Args, Clone)]
pub struct StepsCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 {
        return Err(format!("Invalid key=value pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}
