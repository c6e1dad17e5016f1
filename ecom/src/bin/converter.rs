use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use ecom::{
    converter::convert_export,
    setup::local_enricher,
};
use processing::{
    enrichment::Enricher,
    executable_utils::{ConfigArgs, initialize_executable},
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a shop platform export into a scoring dataset", long_about = None)]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,

    /// Platform export with orders under "data"
    input: PathBuf,

    /// Output file, stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Resolve ASN, device and district for every order
    #[arg(long)]
    enrich: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = initialize_executable(&args.config).map_err(|e| anyhow::anyhow!(e))?;

    let contents = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read export {}", args.input.display()))?;
    let mut orders = convert_export(&contents).context("failed to convert export")?;
    tracing::info!(orders = orders.len(), "Converted export");

    if args.enrich {
        let enricher = local_enricher(&config)?;
        for converted in &mut orders {
            match enricher.enrich(&converted.order).await {
                Ok(order) => converted.order = order,
                Err(e) => tracing::warn!(error = %e, "Enrichment failed, keeping order as exported"),
            }
        }
    }

    // same layout the trainer reads
    let mut dataset = serde_json::Map::new();
    dataset.insert(config.engine.dataset_key.clone(), serde_json::to_value(&orders)?);
    let json = serde_json::to_string_pretty(&dataset)?;
    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}
