use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::{path::PathBuf, sync::Arc};

use ecom::{
    enrichment::OrderInfoClient,
    model::RawOrder,
    setup::{local_enricher, order_engine},
};
use processing::{
    executable_utils::{ConfigArgs, initialize_executable},
    model::Prediction,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Enrich {
    /// Score the order as given
    None,
    /// ASN lookup, user agent parsing and address classification in process
    Local,
    /// Ask the order-info service
    Remote,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Score one order for cancellation and fraud risk", long_about = None)]
struct Args {
    #[command(flatten)]
    config: ConfigArgs,

    /// JSON file holding a single order
    order: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Enrich::None)]
    enrich: Enrich,
}

#[derive(Serialize)]
struct ScoreOutput<'a> {
    #[serde(flatten)]
    prediction: Prediction,
    district_detected: Option<String>,
    schema_fingerprint: Option<String>,
    order: &'a RawOrder,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = initialize_executable(&args.config).map_err(|e| anyhow::anyhow!(e))?;

    let contents = std::fs::read_to_string(&args.order)
        .with_context(|| format!("failed to read order {}", args.order.display()))?;
    let order: RawOrder = serde_json::from_str(&contents)
        .with_context(|| format!("{} is not a valid order", args.order.display()))?;

    let engine = Arc::new(order_engine(&config).context("failed to build feature catalog")?);
    // first fit reads the whole default dataset
    let trainer = Arc::clone(&engine);
    tokio::task::spawn_blocking(move || trainer.ensure_fitted())
        .await?
        .context("failed to train model")?;

    let prediction = match args.enrich {
        Enrich::None => engine.predict(&order)?,
        Enrich::Local => {
            let enricher = local_enricher(&config)?;
            engine.predict_from_external_source(&order, &enricher).await?
        }
        Enrich::Remote => {
            let client = OrderInfoClient::new(&config.enrichment)?;
            engine.predict_from_external_source(&order, &client).await?
        }
    };

    let output = ScoreOutput {
        prediction,
        district_detected: engine.encoder().resolve_district(&order),
        schema_fingerprint: engine.schema().map(|s| format!("{:08x}", s.fingerprint())),
        order: &order,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
