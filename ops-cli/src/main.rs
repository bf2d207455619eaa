use clap::Parser;
use colored::Colorize;
use ops_cli::{run, Cli};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {:#}", "error:".bright_red(), err);
            ExitCode::FAILURE
        }
    }
}
