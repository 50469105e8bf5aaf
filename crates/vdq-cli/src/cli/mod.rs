//! CLI for the VDQ video download queue.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use vdq_core::config;
use vdq_core::services::Services;

use commands::{run_job, run_serve, run_status, run_submit, run_work};

/// Top-level CLI for the VDQ video download queue.
#[derive(Debug, Parser)]
#[command(name = "vdq")]
#[command(about = "VDQ: submit video URLs and download them in the background", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Serve the HTTP API (and run workers in-process when configured).
    Serve {
        /// Address to bind, overriding `listen` from the config.
        #[arg(long, value_name = "ADDR")]
        listen: Option<String>,
    },

    /// Run only the worker loop, processing queued jobs until interrupted.
    Work {
        /// Run up to N jobs concurrently (default: `workers` from the config).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
    },

    /// Submit a video URL for download.
    Submit {
        /// Video page URL.
        url: String,
    },

    /// Show recent jobs and finished files.
    Status,

    /// Show the live status of one job.
    Job {
        /// Job identifier.
        id: String,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let services = Services::open(&cfg).await?;

        match cli.command {
            CliCommand::Serve { listen } => run_serve(&cfg, &services, listen).await?,
            CliCommand::Work { workers } => run_work(&services, workers).await?,
            CliCommand::Submit { url } => run_submit(&services, &url).await?,
            CliCommand::Status => run_status(&services).await?,
            CliCommand::Job { id } => run_job(&services, &id).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
