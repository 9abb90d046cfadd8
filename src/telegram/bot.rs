//! Bot initialization and command definitions

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, BotConfig};

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "snake_case", description = "Available commands:")]
pub enum Command {
    #[command(description = "show the main menu")]
    Start,
    #[command(description = "cancel the current request")]
    Cancel,
    #[command(description = "list your pending requests")]
    MyRequests,
    #[command(description = "pay a request with a custom amount: /pay <id> <amount> (admins)")]
    Pay(String),
    #[command(description = "payment statistics: /stats [days] (admins)")]
    Stats(String),
    #[command(description = "list employees (admins)")]
    Employees,
    #[command(description = "add an employee: /add_employee <id> (admins)")]
    AddEmployee(String),
    #[command(description = "remove an employee: /remove_employee <id> (admins)")]
    RemoveEmployee(String),
}

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to create bot (invalid URL, HTTP client setup)
pub fn create_bot(bot_config: &BotConfig) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(bot_config.bot_token.clone(), client);

    // Check if local Bot API server is configured
    let bot = match &bot_config.bot_api_url {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(vec![
        BotCommand::new("start", "show the main menu"),
        BotCommand::new("cancel", "cancel the current request"),
        BotCommand::new("my_requests", "list your pending requests"),
        BotCommand::new("pay", "pay a request with a custom amount (admins)"),
        BotCommand::new("stats", "payment statistics (admins)"),
        BotCommand::new("employees", "list employees (admins)"),
        BotCommand::new("add_employee", "add an employee (admins)"),
        BotCommand::new("remove_employee", "remove an employee (admins)"),
    ])
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_descriptions() {
        let command_list = format!("{}", Command::descriptions());

        assert!(command_list.contains("Available commands"));
        assert!(command_list.contains("/add_employee"));
        assert!(command_list.contains("/my_requests"));
    }

    #[test]
    fn test_parse_commands_with_arguments() {
        assert_eq!(
            Command::parse("/pay 7 25", "telepay_bot").unwrap(),
            Command::Pay("7 25".to_string())
        );
        assert_eq!(Command::parse("/stats", "telepay_bot").unwrap(), Command::Stats(String::new()));
        assert_eq!(
            Command::parse("/remove_employee 42", "telepay_bot").unwrap(),
            Command::RemoveEmployee("42".to_string())
        );
    }
}
