use thiserror::Error;

/// Centralized error types for the application
///
/// Infrastructure failures (database, pool, migrations, configuration)
/// are converted to this enum for consistent error handling. Expected denials
/// such as malformed user input or an already-paid request have their own
/// typed errors close to the code that produces them.
///
/// # Example
///
/// ```no_run
/// use telepay::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database connection pool errors
    #[error("Database pool error: {0}")]
    DatabasePool(#[from] r2d2::Error),

    /// Schema migration errors
    #[error("Migration error: {0}")]
    Migration(String),

    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
