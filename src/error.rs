use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed data file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid stored record: {0}")]
    Invalid(#[from] ValidationError),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{field} is too short (min {min} characters)")]
    TooShort { field: &'static str, min: usize },
    #[error("{field} is too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },
    #[error("name contains unsupported characters")]
    InvalidName,
    #[error("age must be a number from 7 to 14")]
    InvalidAge,
    #[error("phone number is not a valid Uzbek number")]
    InvalidPhone,
    #[error("a question needs 2 to 4 options, got {0}")]
    OptionCount(usize),
    #[error("correct option {index} is outside of {len} options")]
    CorrectOutOfRange { index: usize, len: usize },
    #[error("expected an option number")]
    NotANumber,
    #[error("unknown age group '{0}'")]
    UnknownAgeGroup(String),
    #[error("unknown admin role '{0}'")]
    UnknownRole(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} should be set")]
    Missing(&'static str),
    #[error("{name} has invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("excel export failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("pdf export failed: {0}")]
    Pdf(String),
}
