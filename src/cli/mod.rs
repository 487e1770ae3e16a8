// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and delegates to Layer 2.
//
//   train    loads, trains, evaluates, saves and uploads; prints
//            the result record as JSON, or `null` when an upload
//            failed
//   inspect  prints the prepared columns, the target and the
//            suggested task type

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InspectArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "tabular-dl",
    version,
    about = "Train a dense neural network on a tabular dataset and publish the artifacts."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Inspect(args) => run_inspect(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on dataset: {}", args.dataset);

    let use_case = TrainUseCase::new(args.into());
    let record = use_case.execute()?;

    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::application::inspect_use_case::InspectUseCase;

    let summary = InspectUseCase::new(args.dataset, args.delimiter).execute()?;

    println!("Rows:    {}", summary.rows);
    println!("Target:  {} ({} distinct values)", summary.target, summary.distinct_target);
    println!("Task:    {} (suggested)", summary.suggested_task);
    println!("Columns:");
    for name in &summary.columns {
        let marker = if *name == summary.target { " *" } else { "" };
        println!("  {name}{marker}");
    }
    Ok(())
}
