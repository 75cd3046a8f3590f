//! # Storefront CLI
//!
//! `storefront [--config <file>] <command> [args]` runs one command.
//! Without a command it reads commands from stdin until `quit` or EOF, all
//! in one session.

use std::path::PathBuf;
use std::process::ExitCode;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error};

use marquee_storefront::commands::{self, Command};
use marquee_storefront::{Storefront, StorefrontConfig, StorefrontResult};

#[tokio::main]
async fn main() -> ExitCode {
    marquee_storefront::init_tracing();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = match take_config_flag(&mut args) {
        Ok(path) => path,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    let session = StorefrontConfig::load(config_path).and_then(Storefront::open);
    let sf = match session {
        Ok(sf) => sf,
        Err(e) => {
            error!(error = %e, "Could not start storefront");
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    if args.is_empty() {
        return match shell(&sf).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            }
        };
    }

    let command = match commands::parse(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };
    match commands::execute(&sf, command).await {
        Ok(out) => {
            println!("{out}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Interactive loop over stdin.
async fn shell(sf: &Storefront) -> StorefrontResult<()> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout
        .write_all(b"Marquee storefront. Type 'help' for commands.\n")
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let words = match commands::split_line(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(message) => {
                stdout.write_all(format!("{message}\n").as_bytes()).await?;
                continue;
            }
        };

        let reply = match commands::parse(&words) {
            Ok(Command::Quit) => break,
            Ok(command) => match commands::execute(sf, command).await {
                Ok(out) => out,
                Err(e) => e.to_string(),
            },
            Err(message) => message,
        };
        stdout.write_all(format!("{reply}\n").as_bytes()).await?;
    }

    debug!("Shell closed");
    Ok(())
}

/// Removes `--config <file>` from the arguments.
fn take_config_flag(args: &mut Vec<String>) -> Result<Option<PathBuf>, String> {
    let Some(pos) = args.iter().position(|a| a == "--config") else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        return Err("--config needs a file path".into());
    }
    let path = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(PathBuf::from(path)))
}
