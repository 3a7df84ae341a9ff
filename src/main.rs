use anyhow::Context;
use clap::Parser;
use log::info;

use moviebench::bench::build_orchestrator;
use moviebench::conf::Config;
use moviebench::core::{CliArgs, setup_logging};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    setup_logging();
    let args = CliArgs::parse();

    let config = Config::load(args.config.as_deref())
        .and_then(|config| config.with_args(&args))
        .context("loading configuration")?;
    info!(
        "moviebench started: mode {}, {} trials",
        config.bench.mode, config.bench.trials
    );

    let mut orchestrator = build_orchestrator(&config)
        .await
        .context("preparing backends")?;
    let report = orchestrator.run().await.context("benchmark run aborted")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
