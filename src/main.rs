use invoke_chain::cli::output::*;
use invoke_chain::cli::{Cli, Command};
use invoke_chain::cli::commands::{RunCommand, StepsCommand, ValidateCommand};
use invoke_chain::core::{CallContext, PipelineError};
use invoke_chain::core::config::PipelinesConfig;
use invoke_chain::execution::{invoke, BuildReport, PipelineRegistry};
use invoke_chain::steps::builtin_registry;

use anyhow::{Context, Result};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Validate(cmd) => validate_pipelines(cmd)?,
        Command::Run(cmd) => run_pipeline(cmd).await?,
        Command::Steps(cmd) => list_steps(cmd)?,
    }

    Ok(())
}

/// Load a config file and build its pipelines against the built-in steps
fn load_registry(file: &str) -> Result<(PipelinesConfig, PipelineRegistry, BuildReport)> {
    let config = PipelinesConfig::from_file(file)
        .with_context(|| format!("Failed to load pipelines config from {}", file))?;
    let steps = builtin_registry();
    let (registry, report) = PipelineRegistry::from_config(&config, &steps);
    Ok((config, registry, report))
}

fn validate_pipelines(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating pipelines...", INFO);

    let (config, registry, report) = load_registry(&cmd.file)?;

    let unknown = config.unknown_steps(&builtin_registry());
    for (service_type, pipeline, step) in &unknown {
        println!(
            "  {} {}.{}: unknown step {}",
            WARN,
            service_type,
            pipeline,
            style(step).yellow()
        );
    }

    for key in &report.registered {
        let pipeline = registry.lookup(&key.service_type, &key.name)?;
        println!("  {}", format_pipeline(&pipeline));
    }
    for err in &report.errors {
        println!("  {}", format_build_error(err));
    }

    if cmd.json {
        let pipelines: Vec<_> = report
            .registered
            .iter()
            .filter_map(|key| registry.lookup(&key.service_type, &key.name).ok())
            .map(|pipeline| {
                serde_json::json!({
                    "service_type": pipeline.service_type,
                    "name": pipeline.name,
                    "steps": pipeline.step_names(),
                })
            })
            .collect();
        let errors: Vec<String> = report.errors.iter().map(|e| e.to_string()).collect();
        let unknown_steps: Vec<_> = unknown
            .iter()
            .map(|(service_type, pipeline, step)| {
                serde_json::json!({
                    "service_type": service_type,
                    "pipeline": pipeline,
                    "step": step,
                })
            })
            .collect();
        let data = serde_json::json!({
            "default_pipeline": config.default_pipeline,
            "mode": config.mode,
            "pipelines": pipelines,
            "errors": errors,
            "unknown_steps": unknown_steps,
        });
        println!("\n{}", serde_json::to_string_pretty(&data)?);
    }

    if report.is_ok() {
        println!(
            "\n{} {} pipelines built {}",
            CHECK,
            style(report.registered.len()).cyan(),
            style("successfully").green()
        );
        Ok(())
    } else {
        println!(
            "\n{} {} of {} pipelines {}",
            CROSS,
            style(report.errors.len()).red(),
            report.errors.len() + report.registered.len(),
            style("failed to build").red()
        );
        std::process::exit(1);
    }
}

async fn run_pipeline(cmd: &RunCommand) -> Result<()> {
    let (_config, registry, report) = load_registry(&cmd.file)?;
    for err in &report.errors {
        eprintln!("{}", format_build_error(err));
    }

    let pipeline = match registry.lookup(&cmd.service_type, &cmd.pipeline) {
        Ok(pipeline) => pipeline,
        Err(e @ PipelineError::NotFound(_)) => {
            println!("{} {}", CROSS, style(&e).red());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    if !cmd.json {
        println!("{} {}", ROCKET, format_pipeline(&pipeline));
    }

    let mut ctx = CallContext::new(cmd.service.as_str(), cmd.operation.as_str());
    if let Some(args) = &cmd.args {
        ctx.args = serde_json::from_str(args).context("Invalid --args JSON")?;
    }
    for (key, value) in &cmd.meta {
        ctx.set_metadata(key.as_str(), value.as_str());
    }

    let (ctx, response) = invoke(pipeline.clone(), ctx).await?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&call_summary(&ctx, &response)?)?);
        if response.err.is_some() {
            std::process::exit(1);
        }
        return Ok(());
    }

    println!(
        "{} Call {} ran {} of {} steps",
        INFO,
        style(&ctx.id.to_string()[..8]).dim(),
        style(ctx.step_index).cyan(),
        pipeline.len()
    );
    println!("{}", format_response(&response));

    if let Some(err) = &response.err {
        error!("{:#}", err);
        std::process::exit(1);
    }

    Ok(())
}

fn list_steps(cmd: &StepsCommand) -> Result<()> {
    let names = builtin_registry().names();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    println!("{} Built-in steps:", INFO);
    for name in &names {
        println!("  {}", style(name).bold());
    }
    Ok(())
}
