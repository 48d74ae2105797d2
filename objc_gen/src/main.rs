use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cmds;

#[derive(Parser)]
#[command(name = "objc-gen")]
#[command(about = "Objective-C enum field generator for protocol buffer schemas", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose output (debug logging unless RUST_LOG is set)
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Objective-C headers and implementations
    Codegen {
        #[command(flatten)]
        input: cmds::common::InputArgs,

        /// Output directory for generated code (overrides the config file)
        #[arg(short = 'o', long = "output", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// YAML generator config
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Print the derived facts, forward declarations and dependencies of every enum field as JSON
    Analyze {
        #[command(flatten)]
        input: cmds::common::InputArgs,

        /// YAML generator config
        #[arg(short = 'c', long = "config", value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Codegen {
            input,
            output_dir,
            config,
        } => {
            cmds::codegen::run(&input, output_dir, config.as_deref())?;
        }

        Commands::Analyze { input, config } => {
            cmds::analyze::run(&input, config.as_deref())?;
        }
    }

    Ok(())
}
