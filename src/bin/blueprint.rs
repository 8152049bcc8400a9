use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as AnyhowContext, Result};
use blueprint_studio::codec::{encode, serialize_for_transport, share_url};
use blueprint_studio::compiler::loader::{load_config, load_document, load_payload};
use blueprint_studio::compiler::{Compiler, decompile_with_report};
use blueprint_studio::config::StudioConfig;
use blueprint_studio::dsl::{BuilderPayload, LandingMode};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a saved builder payload into a blueprint
    Compile {
        /// Path to the payload (JSON or YAML)
        #[arg(long, short)]
        file: PathBuf,

        /// Site title, overrides the payload's
        #[arg(long)]
        title: Option<String>,

        /// Landing page: admin, front-page or custom
        #[arg(long, value_parser = parse_landing)]
        landing: Option<LandingMode>,

        /// Landing URL used with `--landing custom`
        #[arg(long)]
        custom_url: Option<String>,

        /// YAML file overriding the built-in defaults
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the blueprint here instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Compile a payload and print a shareable playground link
    Share {
        #[arg(long, short)]
        file: PathBuf,

        /// Link to the studio view instead of the plain playground
        #[arg(long)]
        studio: bool,

        /// Playground host, overrides the config
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Convert an exported blueprint back into builder steps
    Decompile {
        /// Path to the blueprint JSON
        #[arg(long, short)]
        file: PathBuf,

        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

fn parse_landing(s: &str) -> Result<LandingMode, String> {
    s.parse()
}

fn studio_config(path: Option<&Path>) -> Result<StudioConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(StudioConfig::default()),
    }
}

fn emit(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { file, title, landing, custom_url, config, out } => {
            let mut payload: BuilderPayload = load_payload(&file)?;
            info!("Loaded {} steps from {:?}", payload.steps.len(), file);

            if let Some(title) = title {
                payload.blueprint_title = title;
            }
            if let Some(landing) = landing {
                payload.landing_page_type = landing;
            }
            if custom_url.is_some() {
                payload.custom_landing_url = custom_url;
            }

            let compiler = Compiler::with_config(studio_config(config.as_deref())?);
            let blueprint = compiler.compile_payload(&payload);
            info!("Compiled blueprint with {} instructions.", blueprint.steps.len());

            let json = serde_json::to_string_pretty(&blueprint)?;
            emit(&json, out.as_deref())?;
        }

        Commands::Share { file, studio, host, config } => {
            let config = studio_config(config.as_deref())?;

            let payload = load_payload(&file)?;
            let compiler = Compiler::with_config(config);
            let host = host.unwrap_or_else(|| compiler.config().share_host.clone());
            let blueprint = compiler.compile_payload(&payload);

            let json = serialize_for_transport(&blueprint).context("export failed")?;
            let encoded = encode(&json).context("export failed")?;
            println!("{}", share_url(&host, &encoded, studio));
        }

        Commands::Decompile { file, out } => {
            let document = load_document(&file)?;
            let report = decompile_with_report(&document);
            if !report.dropped.is_empty() {
                warn!("{} instructions could not be converted", report.dropped.len());
            }
            info!("Recovered {} steps.", report.steps.len());

            let payload = BuilderPayload {
                landing_page_type: LandingMode::Custom,
                custom_landing_url: Some(document.landing_page.clone()),
                steps: report.steps,
                ..Default::default()
            };
            let json = serde_json::to_string_pretty(&payload)?;
            emit(&json, out.as_deref())?;
        }
    }

    Ok(())
}
