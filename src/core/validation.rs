//! Validation of user-supplied request fields
//!
//! Provides checks for the free-text fields an employee types into the request form:
//! - Balance text (display string, must mention a number)
//! - Target account identifier (canonicalized to `@name`)
//! - HTML escaping for anything embedded into rich-formatted captions
//!
//! Malformed input is an expected case: every validator returns a `Result`
//! with a human-readable reason and never panics.

use thiserror::Error;

/// Longest balance text accepted, in characters
pub const MAX_BALANCE_LEN: usize = 50;

/// Shortest account identifier accepted (without the leading `@`)
pub const MIN_ACCOUNT_LEN: usize = 2;

/// Longest account identifier accepted (without the leading `@`)
pub const MAX_ACCOUNT_LEN: usize = 100;

/// Validation errors
///
/// The `Display` text is shown to the employee as the re-prompt reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Balance cannot be empty")]
    EmptyBalance,

    #[error("Balance is too long (maximum {} characters)", MAX_BALANCE_LEN)]
    BalanceTooLong,

    #[error("Balance must contain a numeric value")]
    BalanceWithoutDigits,

    #[error("Account cannot be empty")]
    EmptyAccount,

    #[error("Account is too short (minimum {} characters)", MIN_ACCOUNT_LEN)]
    AccountTooShort,

    #[error("Account is too long (maximum {} characters)", MAX_ACCOUNT_LEN)]
    AccountTooLong,

    #[error("Account may only contain letters, digits, '_', '-' and '.'")]
    AccountInvalidCharacters,
}

/// Validates the balance text.
///
/// No numeric parsing happens: the balance is a display string such as `100$`
/// or `25.50 USD`. Surrounding whitespace is trimmed.
///
/// # Examples
/// ```
/// use telepay::core::validation::validate_balance;
///
/// assert_eq!(validate_balance(" 100$ ").unwrap(), "100$");
/// assert!(validate_balance("abc").is_err());
/// ```
pub fn validate_balance(text: &str) -> Result<String, ValidationError> {
    let balance = text.trim();

    if balance.is_empty() {
        return Err(ValidationError::EmptyBalance);
    }
    if balance.chars().count() > MAX_BALANCE_LEN {
        return Err(ValidationError::BalanceTooLong);
    }
    if !balance.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::BalanceWithoutDigits);
    }

    Ok(balance.to_string())
}

/// Validates the target account identifier and returns it in canonical `@name` form.
///
/// Any number of leading `@` characters is dropped first.
///
/// # Examples
/// ```
/// use telepay::core::validation::validate_account;
///
/// assert_eq!(validate_account("myacct").unwrap(), "@myacct");
/// assert_eq!(validate_account("@my.acct").unwrap(), "@my.acct");
/// assert!(validate_account("user@name!").is_err());
/// ```
pub fn validate_account(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    let name = trimmed.trim_start_matches('@').trim();

    if name.is_empty() {
        return Err(ValidationError::EmptyAccount);
    }

    let len = name.chars().count();
    if len < MIN_ACCOUNT_LEN {
        return Err(ValidationError::AccountTooShort);
    }
    if len > MAX_ACCOUNT_LEN {
        return Err(ValidationError::AccountTooLong);
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(ValidationError::AccountInvalidCharacters);
    }

    Ok(format!("@{}", name))
}

/// Escapes `& < > " '` so user text can be embedded into HTML captions.
///
/// Applied exactly once per field; already-escaped entities are escaped again.
pub fn sanitize_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }

    result
}
