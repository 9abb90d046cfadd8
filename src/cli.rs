use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "telepay")]
#[command(author, version, about = "Telegram bot for employee payment requests", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the bot with long polling (default)
    Run,

    /// Import employees listed in EMPLOYEE_IDS into the roster
    ImportEmployees {
        /// Only show which ids would be imported
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
