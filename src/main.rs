use anyhow::{Context, Result};
use clap::Parser;
use confound::{cli::Cli, config::AnalysisConfig, loader, pipeline, report};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;

    let dataset = loader::load_dataset(&args.path)?;
    tracing::info!(records = dataset.len(), "dataset loaded");

    let analysis = pipeline::run(&dataset, &config)
        .with_context(|| format!("Analysis of {} failed", args.path.display()))?;

    let output = report::render(&analysis, &config.report).context("Failed to render report")?;
    print!("{}", output);
    if !output.ends_with('\n') {
        println!();
    }

    Ok(())
}
