use anyhow::Context;
use clap::Parser;
use std::{path::PathBuf, sync::Arc};

use ecom::setup::{order_dataset, order_engine};
use processing::{
    dataset::JsonDataset,
    executable_utils::{ConfigArgs, initialize_executable},
    trainer::TrainingPipeline,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Train the cancellation and fraud models and print the evaluation", long_about = None)]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,

    /// Labeled dataset, overrides engine.dataset_path
    #[arg(short, long)]
    dataset: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = initialize_executable(&args.config).map_err(|e| anyhow::anyhow!(e))?;

    let source = match &args.dataset {
        Some(path) => JsonDataset::new(path, &config.engine.dataset_key),
        None => order_dataset(&config),
    };
    let engine = Arc::new(order_engine(&config).context("failed to build feature catalog")?);

    let pipeline = TrainingPipeline::new(Arc::new(source), engine);
    let outcome = pipeline.run().context("training failed")?;

    match &outcome.report {
        Some(report) => println!("{report}"),
        None => println!(
            "Trained on all {} records; too few for a held-out evaluation.",
            outcome.records
        ),
    }

    Ok(())
}
