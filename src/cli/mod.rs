// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, picks the burn backend, hands off to
// the use cases and prints their results. No business logic here.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{Context, Result};
use burn::tensor::backend::AutodiffBackend;
use clap::Parser;
use commands::{ClassifyArgs, Commands, DeviceArg, InitBackboneArgs, TrainArgs};

use docclass::application::{
    classify_use_case::ClassifyUseCase,
    train_use_case::{init_backbone, TrainUseCase},
};
use docclass::ml::model::EncoderConfig;
use docclass::ml::CpuBackend;

#[derive(Parser, Debug)]
#[command(
    name = "docclass",
    version,
    about = "OCR scanned documents and classify them with a fine-tuned transformer."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::InitBackbone(args) => run_init_backbone(args),
            Commands::Train(args) => match args.device {
                DeviceArg::Cpu => run_train::<CpuBackend>(args),
                #[cfg(feature = "wgpu")]
                DeviceArg::Wgpu => run_train::<docclass::ml::WgpuBackend>(args),
            },
            Commands::Classify(args) => match args.device {
                DeviceArg::Cpu => run_classify::<CpuBackend>(args),
                #[cfg(feature = "wgpu")]
                DeviceArg::Wgpu => run_classify::<docclass::ml::WgpuBackend>(args),
            },
        }
    }
}

fn run_init_backbone(args: InitBackboneArgs) -> Result<()> {
    let manifest = init_backbone(
        &args.output_dir,
        &args.corpus,
        args.vocab_size,
        EncoderConfig::from(&args),
    )
    .with_context(|| format!("cannot create backbone in '{}'", args.output_dir.display()))?;

    println!(
        "Backbone written to {} (vocab {}, d_model {}, {} layers)",
        args.output_dir.display(),
        manifest.encoder.vocab_size,
        manifest.encoder.d_model,
        manifest.encoder.num_layers
    );
    Ok(())
}

fn run_train<B: AutodiffBackend>(args: TrainArgs) -> Result<()> {
    tracing::info!("Training on '{}'", args.dataset.display());

    let output_dir = args.output_dir.clone();
    let report = TrainUseCase::<B>::new(args.into(), Default::default())
        .execute()
        .context("training failed")?;

    println!(
        "Trained on {} documents, evaluated on {}.",
        report.train_count, report.eval_count
    );
    if !report.scores.is_empty() {
        println!("Evaluation metrics:");
        for (label, f1) in &report.scores {
            println!(" - {label}_f1: {f1:.3}");
        }
    }
    println!("Model saved to {}", output_dir.display());
    Ok(())
}

fn run_classify<B: AutodiffBackend>(args: ClassifyArgs) -> Result<()> {
    let predictions = ClassifyUseCase::<B>::new((&args).into(), Default::default())
        .execute(args.documents.as_slice())
        .context("classification failed")?;

    println!("{}", serde_json::to_string_pretty(&predictions)?);
    Ok(())
}
