//! Gradecast - Main Entry Point

use clap::Parser;
use gradecast::cli::{cmd_info, cmd_predict, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gradecast=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            data,
            output,
            split_ratio,
            seed,
        } => {
            cmd_train(&data, &output, split_ratio, seed)?;
        }
        Commands::Predict {
            artifacts,
            study_hours,
            attendance,
            internal,
            assignment,
        } => {
            cmd_predict(&artifacts, study_hours, attendance, internal, assignment)?;
        }
        Commands::Info { data } => {
            cmd_info(&data)?;
        }
    }

    Ok(())
}
