#![forbid(unsafe_code)]
//! Demo run: start a fresh chain, verify it, append random transactions,
//! and verify again.

use chainfile::blockchain::Blockchain;
use chainfile::cli::{chain_path, init_logging_from_config, resolve_config};
use chainfile::error::ChainError;
use chainfile::persistence::JsonFilePersistence;
use chainfile::phrases::{demo_proof_of_work, random_phrase};
use clap::Parser;
use colored::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Chain file to (re)create, overriding the configuration
    #[arg(long)]
    file: Option<PathBuf>,
    /// Number of demo transactions to append
    #[arg(short = 'n', long)]
    transactions: Option<usize>,
}

fn report(result: Result<(), ChainError>) {
    match result {
        Ok(()) => println!("{}", "Verified".bright_green()),
        Err(e) => {
            eprintln!("{}", e.to_string().red());
            if let Some(index) = e.integrity_index() {
                eprintln!("{} {}", "Failing index:".red(), index);
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), cli.file.as_deref())?;
    init_logging_from_config(&config);

    let path = chain_path(&config);
    let count = cli.transactions.unwrap_or(config.demo.transactions);

    if JsonFilePersistence::new(&path).remove()? {
        println!("Removed existing chain at {}", path.display().to_string().bright_white());
    }

    let mut chain = Blockchain::open(&path)?;
    report(chain.verify());

    let mut rng = rand::thread_rng();
    for _ in 0..count {
        let block = chain.add(&random_phrase(&mut rng), &demo_proof_of_work())?;
        println!(
            "{} #{} {} {}",
            "+".bright_cyan(),
            block.index(),
            block.transaction().bright_white(),
            block.hash_id().dimmed()
        );
    }

    report(chain.verify());
    Ok(())
}
