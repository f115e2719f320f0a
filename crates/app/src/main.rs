//! Rouge cart CLI

use std::process;

use clap::Parser;

use rouge_app::observability;

mod cli;

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = cli::Cli::parse();

    if let Err(error) = cli.config.validate() {
        eprintln!("{error}");
        process::exit(1);
    }

    if let Err(error) = observability::init(&cli.config.logging) {
        eprintln!("{error}");
        process::exit(1);
    }

    if let Err(error) = cli.run().await {
        eprintln!("{error}");
        process::exit(1);
    }
}
