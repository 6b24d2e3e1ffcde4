//! clientgen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::PathBuf;
use std::process::ExitCode;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use clientgen_core::{Emitter, Generation, NamingStyle, OperationSet, RunConfig, TargetKind};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clientgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Render client source for a set of operation descriptors
    Render {
        /// Operation descriptors (YAML or JSON)
        #[arg(long)]
        operations: PathBuf,
        /// Run configuration (YAML or JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Service name (overrides the config file)
        #[arg(long)]
        service_name: Option<String>,
        /// API group name (overrides the config file)
        #[arg(long)]
        api_group: Option<String>,
        /// Generate async functions
        #[arg(long = "async")]
        async_mode: bool,
        /// Naming style for generated identifiers (snake, camel)
        #[arg(long)]
        naming_style: Option<NamingStyle>,
        /// Output target (e.g., python_httpx)
        #[arg(long)]
        target: Option<TargetKind>,
        /// Emit one unit per first tag instead of a single unit
        #[arg(long)]
        grouped: bool,
        /// Print the diagnostics report as JSON on stderr
        #[arg(long)]
        report_json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Render {
            operations,
            config,
            service_name,
            api_group,
            async_mode,
            naming_style,
            target,
            grouped,
            report_json,
        } => {
            let mut run_config = match &config {
                Some(path) => RunConfig::from_file(path)
                    .await
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => RunConfig::new(
                    service_name.clone().unwrap_or_else(|| "service".to_string()),
                    api_group.clone().unwrap_or_else(|| "default".to_string()),
                ),
            };
            if let Some(name) = service_name {
                run_config.service_name = name;
            }
            if let Some(group) = api_group {
                run_config.api_group_name = group;
            }
            if async_mode {
                run_config.async_mode = true;
            }
            if let Some(style) = naming_style {
                run_config.naming_style = style;
            }
            if let Some(target) = target {
                run_config.target = target;
            }

            tracing::info!("Loading operations from: {}", operations.display());
            let set = OperationSet::from_file(&operations)
                .await
                .with_context(|| format!("Failed to load operations {}", operations.display()))?;

            let emitter = Emitter::new(&run_config);
            let generations = if grouped {
                emitter.emit_grouped(&set.operations)?
            } else {
                vec![emitter.emit(&set.operations)?]
            };

            report(&generations, report_json)?;

            for generation in &generations {
                if grouped {
                    println!("# ---- {} ----", generation.api_group);
                }
                print!("{}", generation.source);
            }

            let failed = generations.iter().any(|g| g.report.has_fatal());
            Ok(if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }
    }
}

fn report(generations: &[Generation], as_json: bool) -> anyhow::Result<()> {
    for generation in generations {
        let report = &generation.report;
        if as_json {
            eprintln!("{}", serde_json::to_string_pretty(report)?);
            continue;
        }
        if !report.is_clean() {
            eprint!("{}", report);
        }
        tracing::info!(
            group = %generation.api_group,
            generated = report.generated,
            "generation finished"
        );
    }
    Ok(())
}
