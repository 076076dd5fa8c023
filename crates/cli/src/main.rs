//! Batch extraction entry point
//!
//! Reads JSONL address records, runs the extraction engine over them in
//! batches, and writes structured results back out as JSONL.

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use address_engine_config::{load_settings, Settings};
use address_engine_gazetteer::GazetteerStore;
use address_engine_pipeline::{
    read_records, write_records, ExtractionEngine, OutputRecord, TaggedSample,
};

fn main() -> anyhow::Result<()> {
    let env = std::env::var("ADDRESS_ENGINE_ENV").ok();
    let config = match load_settings(env.as_deref()) {
        Ok(settings) => {
            // Tracing not yet initialized, use eprintln for early logging
            eprintln!(
                "Loaded configuration from files (env: {})",
                env.as_deref().unwrap_or("default")
            );
            settings
        }
        Err(e) => {
            eprintln!("Warning: failed to load config: {}. Using defaults.", e);
            Settings::default()
        }
    };

    init_tracing(&config);

    tracing::info!("Starting address extraction v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?config.environment,
        config_path = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    let store = GazetteerStore::load(&config.pipeline.data_dir)
        .with_context(|| format!("loading gazetteer from {}", config.pipeline.data_dir))?;

    let engine = ExtractionEngine::new(&store, &config).context("building extraction engine")?;

    let records = read_records(&config.pipeline.input_path)
        .with_context(|| format!("reading {}", config.pipeline.input_path))?;
    tracing::info!(
        records = records.len(),
        input = %config.pipeline.input_path,
        "Read input records"
    );

    let show_inferred = config.postprocess.show_inferred_country;
    let inputs: Vec<TaggedSample> = records.into_iter().map(|r| r.into_sample()).collect();

    let started = Instant::now();
    let mut outputs: Vec<OutputRecord> = Vec::with_capacity(inputs.len());
    let mut failed = 0usize;
    for (index, batch) in inputs.chunks(config.pipeline.batch_size).enumerate() {
        tracing::info!(batch = index, size = batch.len(), "Processing batch");
        let offset = index * config.pipeline.batch_size;
        for (slot, result) in engine.process_batch(batch).into_iter().enumerate() {
            match result {
                Ok(sample) => outputs.push(OutputRecord::from_result(&sample, show_inferred)),
                Err(e) => {
                    failed += 1;
                    tracing::warn!(record = offset + slot, error = %e, "Skipping sample");
                }
            }
        }
    }

    if let Some(parent) = Path::new(&config.pipeline.output_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    write_records(&config.pipeline.output_path, &outputs)
        .with_context(|| format!("writing {}", config.pipeline.output_path))?;

    tracing::info!(
        written = outputs.len(),
        failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        output = %config.pipeline.output_path,
        "Extraction complete"
    );
    Ok(())
}

/// Initialize tracing from the observability settings.
///
/// `RUST_LOG` takes precedence over the configured level when set.
fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.observability.log_level.clone().into());

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
