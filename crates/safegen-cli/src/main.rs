mod catalog_cmd;
mod config;
mod generate_cmd;
mod preview_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use safegen_core::constraint::ConstraintCount;

use config::{CliOverrides, SafegenConfig};
use generate_cmd::GenerateOptions;

#[derive(Parser)]
#[command(
    name = "safegen",
    version,
    about = "Generate safety-constrained robot manipulation planning problems"
)]
struct Cli {
    /// Planner executable (overrides SAFEGEN_PLANNER env var)
    #[arg(long, global = true)]
    planner: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a safegen config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Generate problems whose constraints change the optimal plan
    Generate {
        /// Number of locations per problem
        #[arg(long)]
        locations: usize,
        /// Number of items per problem
        #[arg(long)]
        items: usize,
        /// Number of safety constraints ("all" or -1 for every applicable one)
        #[arg(long, default_value = "all", allow_hyphen_values = true)]
        constraints: ConstraintCount,
        /// Number of problems to generate
        #[arg(long, default_value_t = 1)]
        problems: u32,
        /// Directory for generated artifacts (overrides SAFEGEN_OUTPUT_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Random seed for the whole run
        #[arg(long)]
        seed: Option<u64>,
        /// Give up on a problem after this many rejected candidates
        #[arg(long)]
        max_attempts: Option<u32>,
    },
    /// Sample and print one candidate without running the planner
    Preview {
        /// Number of locations
        #[arg(long)]
        locations: usize,
        /// Number of items
        #[arg(long)]
        items: usize,
        /// Number of safety constraints ("all" or -1 for every applicable one)
        #[arg(long, default_value = "all", allow_hyphen_values = true)]
        constraints: ConstraintCount,
        /// Random seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List the locations and items in the catalog
    Catalog,
    /// Print the planning domain
    Domain,
}

/// Execute the `safegen init` command: write config file.
fn cmd_init(planner: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let mut cfg = config::ConfigFile::default();
    if let Some(command) = planner {
        cfg.planner.command = command.to_string();
    }

    config::save_config_to(&cfg, &path)?;

    println!("Config written to {}", path.display());
    println!("  planner.command = {}", cfg.planner.command);
    println!("  planner.timeout_secs = {}", cfg.planner.timeout_secs);
    println!();
    println!("Next: run `safegen generate --locations 3 --items 4`.");

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { force } => {
            cmd_init(cli.planner.as_deref(), force)?;
        }
        Commands::Generate {
            locations,
            items,
            constraints,
            problems,
            output_dir,
            seed,
            max_attempts,
        } => {
            let resolved = SafegenConfig::resolve(&CliOverrides {
                planner: cli.planner,
                output_dir,
                max_attempts,
            })?;
            let opts = GenerateOptions {
                locations,
                items,
                constraints,
                problems,
                seed,
            };
            generate_cmd::run_generate(&resolved, &opts).await?;
        }
        Commands::Preview {
            locations,
            items,
            constraints,
            seed,
        } => {
            let resolved = SafegenConfig::resolve(&CliOverrides::default())?;
            preview_cmd::run_preview(&resolved.catalog, locations, items, constraints, seed)?;
        }
        Commands::Catalog => {
            let resolved = SafegenConfig::resolve(&CliOverrides::default())?;
            catalog_cmd::run_catalog(&resolved.catalog)?;
        }
        Commands::Domain => {
            let resolved = SafegenConfig::resolve(&CliOverrides::default())?;
            catalog_cmd::run_domain(&resolved.domain);
        }
    }

    Ok(())
}

#[cfg(test)]
mod test_util {
    use std::sync::{Mutex, MutexGuard};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Serialize tests that mutate process environment variables.
    pub fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }
}
