use std::path::PathBuf;

use anyhow::{Context, Result};
use carvana::{
    backend::{create_device, get_backend_name, SelectedBackend, TrainingBackend},
    baseline::run_baseline,
    evaluation::{evaluate_baselines, evaluate_unet, report_lines},
    resize::run_resize,
    submission::write_submission,
    training::run_training,
    PipelineConfig,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "carvana")]
#[command(about = "Carvana image masking: average-mask baseline and U-Net segmentation")]
struct Cli {
    /// JSON pipeline configuration; defaults are used for missing fields
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Downsample the training images and masks
    Resize,

    /// Build the average-mask baselines
    Baseline,

    /// Train the U-Net, keeping the best checkpoint
    Train,

    /// Score the average-mask baselines
    EvalBaseline,

    /// Score the trained U-Net
    EvalUnet {
        /// Checkpoint to evaluate instead of the configured one
        #[arg(long)]
        checkpoint: Option<PathBuf>,
    },

    /// Write a Kaggle submission from the trained U-Net
    Submit {
        /// Checkpoint to use instead of the configured one
        #[arg(long)]
        checkpoint: Option<PathBuf>,
    },

    /// Show backend and configuration
    Info,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("carvana=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::load_or_default(cli.config.as_deref())?;
    let device = create_device();
    tracing::info!(backend = get_backend_name(), "Using backend");

    match cli.command {
        Commands::Resize => {
            run_resize(&config.resize)?;
        }

        Commands::Baseline => run_baseline(&config.baseline)?,

        Commands::Train => {
            let summary =
                run_training::<TrainingBackend>(&config.training, &config.mask_naming, &device)?;
            println!(
                "Best validation dice coefficient: {} ({} epochs)",
                summary.best_valid_dice,
                summary.epochs.len()
            );
            if let Some(checkpoint) = summary.checkpoint {
                println!("Checkpoint: {}", checkpoint.display());
            }
        }

        Commands::EvalBaseline => {
            for (name, summary) in evaluate_baselines(&config.baseline.sets)? {
                for line in report_lines(&format!("in the {name} dataset"), &summary) {
                    println!("{line}");
                }
            }
        }

        Commands::EvalUnet { checkpoint } => {
            let checkpoint = checkpoint.unwrap_or_else(|| config.training.checkpoint.clone());
            let summary = evaluate_unet::<SelectedBackend>(
                &config.evaluation.data,
                &config.mask_naming,
                &checkpoint,
                &device,
            )
            .context("U-Net evaluation failed")?;
            for line in report_lines("of the U-Net", &summary) {
                println!("{line}");
            }
        }

        Commands::Submit { checkpoint } => {
            let checkpoint = checkpoint.unwrap_or_else(|| config.training.checkpoint.clone());
            let rows = write_submission::<SelectedBackend>(
                &config.submission.images,
                &checkpoint,
                &config.submission.output,
                config.input_size()?,
                config.submission.threshold,
                &device,
            )?;
            println!(
                "Wrote {rows} masks to {}",
                config.submission.output.display()
            );
        }

        Commands::Info => {
            println!("Carvana pipeline");
            println!("  Backend: {}", get_backend_name());
            println!("  Device: {device:?}");
            println!("{}", config.to_json()?);
        }
    }

    Ok(())
}
