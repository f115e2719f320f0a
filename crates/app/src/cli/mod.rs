use clap::{Parser, Subcommand};

use rouge_app::{config::AppConfig, context::AppContext};

mod cart;
mod session;

#[derive(Debug, Parser)]
#[command(name = "rouge", about = "Rouge cart CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Cart(cart::CartCommand),
    Login(session::LoginArgs),
    Logout,
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let context = AppContext::from_config(&self.config)
            .map_err(|error| format!("failed to start: {error}"))?;

        match self.command {
            Commands::Cart(command) => cart::run(&context, command).await,
            Commands::Login(args) => session::login(&context, args).await,
            Commands::Logout => session::logout(&context).await,
        }
    }
}
