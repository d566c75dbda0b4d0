#![forbid(unsafe_code)]
//! Command-line access to a chain file: append, verify, inspect.

use chainfile::blockchain::{Block, BlockField, Blockchain};
use chainfile::cli::{init_logging_from_config, load_blockchain_from_config, resolve_config, short_hash};
use chainfile::phrases::demo_proof_of_work;
use clap::{Args, Parser, Subcommand};
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Chain file, overriding the configuration
    #[arg(long, global = true)]
    file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Appends a transaction to the chain
    Add {
        /// Transaction text to commit
        transaction: String,
        /// Proof-of-work label; generated when omitted
        #[arg(long)]
        pow: Option<String>,
    },
    /// Verifies the integrity of the whole chain
    Verify,
    /// Shows a single block
    Show {
        #[command(flatten)]
        target: Target,
        /// Print only this field (index, timestamp, proof-of-work, transaction, hashid)
        #[arg(long)]
        field: Option<String>,
    },
    /// Shows the last block
    Last,
    /// Lists every block
    List,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Target {
    /// Block index
    #[arg(long)]
    index: Option<u64>,
    /// Block hash id
    #[arg(long)]
    id: Option<String>,
}

fn print_block(block: &Block) {
    println!("{:>14} {}", "index:".bright_cyan(), block.index());
    println!("{:>14} {}", "timestamp:".bright_cyan(), block.timestamp());
    println!("{:>14} {}", "proof-of-work:".bright_cyan(), block.proof_of_work());
    println!("{:>14} {}", "transaction:".bright_cyan(), block.transaction().bright_white());
    println!("{:>14} {}", "hashid:".bright_cyan(), block.hash_id());
}

fn list(chain: &Blockchain) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            BlockField::ALL
                .iter()
                .map(|field| Cell::new(field.as_str()).add_attribute(Attribute::Bold)),
        );

    for block in chain.blocks() {
        table.add_row(vec![
            Cell::new(block.index()),
            Cell::new(block.timestamp()),
            Cell::new(block.proof_of_work()),
            Cell::new(block.transaction()),
            Cell::new(short_hash(block.hash_id())),
        ]);
    }

    println!("{table}");
    println!("{} block(s) in {}", chain.len(), chain.location());
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = resolve_config(cli.config.as_deref(), cli.file.as_deref())?;
    init_logging_from_config(&config);
    let mut chain = load_blockchain_from_config(&config)?;

    match cli.command {
        Commands::Add { transaction, pow } => {
            let pow = pow.unwrap_or_else(demo_proof_of_work);
            let block = chain.add(&transaction, &pow)?;
            println!("{} block {}", "Added".bright_green(), block.index());
            print_block(block);
        }
        Commands::Verify => match chain.verify() {
            Ok(()) => println!("{}", "Verified".bright_green()),
            Err(e) => {
                eprintln!("{}", e.to_string().red().bold());
                return Ok(ExitCode::from(2));
            }
        },
        Commands::Show { target, field } => {
            let block = match (target.index, target.id) {
                (Some(index), _) => chain.get_by_index(index)?,
                (None, Some(id)) => chain.get_by_id(&id)?,
                (None, None) => return Err("either --index or --id is required".into()),
            };
            match field {
                Some(name) => println!("{}", block.get(&name)?),
                None => print_block(block),
            }
        }
        Commands::Last => print_block(chain.last_block()),
        Commands::List => list(&chain),
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
