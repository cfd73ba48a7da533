pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "leadbot",
    about = "Leadbot operator CLI",
    long_about = "Operate the lead-capture chatbot: migrations, readiness checks, config inspection, one-off chat turns and lead statistics.",
    after_help = "Examples:\n  leadbot doctor --json\n  leadbot chat --session demo \"book a job\"\n  leadbot stats"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Check templates, config and database readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Send one chat message through the conversation runtime")]
    Chat {
        #[arg(long, help = "Session id the message belongs to")]
        session: String,
        #[arg(long, help = "Use in-memory stores instead of the configured database")]
        dry_run: bool,
        message: String,
    },
    #[command(about = "Print lead counts by status")]
    Stats,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Config => commands::config::run(),
        Command::Chat { session, dry_run, message } => {
            commands::chat::run(&session, &message, dry_run)
        }
        Command::Stats => commands::stats::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn chat_takes_session_flag_and_positional_message() {
        let cli = Cli::try_parse_from(["leadbot", "chat", "--session", "s-1", "book a job"])
            .expect("parse chat");
        match cli.command {
            Command::Chat { session, dry_run, message } => {
                assert_eq!(session, "s-1");
                assert!(!dry_run);
                assert_eq!(message, "book a job");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn chat_requires_a_session() {
        assert!(Cli::try_parse_from(["leadbot", "chat", "hello"]).is_err());
    }
}
