//! readiness CLI: run security-readiness assessments from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use readiness_core::model::Audience;

mod commands;

#[derive(Parser)]
#[command(name = "readiness", version, about = "Security readiness assessments")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example catalog
    Init,

    /// Validate catalog TOML files
    Validate {
        /// Catalog file or directory (default: the configured catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// List the questions an attempt would ask
    Questions {
        /// Audience: individual or organization
        #[arg(long)]
        audience: Option<Audience>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Start a new attempt
    Start {
        #[arg(long)]
        subject: String,

        /// Audience: individual or organization
        #[arg(long)]
        audience: Option<Audience>,
    },

    /// Record an answer
    Answer {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        attempt: u32,

        /// Question ID
        #[arg(long)]
        question: String,

        /// Option label
        #[arg(long)]
        option: String,
    },

    /// Show answered and missing questions of an attempt
    Progress {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        attempt: u32,
    },

    /// Score and finalize an attempt
    Finalize {
        #[arg(long)]
        subject: String,

        #[arg(long)]
        attempt: u32,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show finalized attempts and the score trend
    History {
        #[arg(long)]
        subject: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Recommend the weakest categories of the latest attempt
    Recommend {
        #[arg(long)]
        subject: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Compare the two most recent finalized attempts
    Compare {
        #[arg(long)]
        subject: String,

        /// Percentage-point change below which a category counts as unchanged
        #[arg(long, default_value = "1.0")]
        threshold: f64,

        /// Exit code 1 if any category regressed
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("readiness=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { catalog } => commands::validate::execute(catalog, config),
        Commands::Questions { audience, format } => {
            commands::questions::execute(audience, format, config)
        }
        Commands::Start { subject, audience } => {
            commands::start::execute(subject, audience, config).await
        }
        Commands::Answer {
            subject,
            attempt,
            question,
            option,
        } => commands::answer::execute(subject, attempt, question, option, config).await,
        Commands::Progress { subject, attempt } => {
            commands::answer::progress(subject, attempt, config).await
        }
        Commands::Finalize {
            subject,
            attempt,
            format,
        } => commands::finalize::execute(subject, attempt, format, config).await,
        Commands::History { subject, format } => {
            commands::history::execute(subject, format, config).await
        }
        Commands::Recommend { subject, format } => {
            commands::recommend::execute(subject, format, config).await
        }
        Commands::Compare {
            subject,
            threshold,
            fail_on_regression,
            format,
        } => {
            commands::compare::execute(subject, threshold, fail_on_regression, format, config)
                .await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
