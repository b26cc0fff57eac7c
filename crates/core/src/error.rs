/// Client-visible error taxonomy. Everything that crosses the service
/// boundary is one of these; raw storage errors are wrapped into
/// `Storage` with a descriptive message and never propagate as-is.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("Email already exists")]
    DuplicateUser,
    #[error("Report already exists with this name")]
    DuplicateReport,
    #[error("User not found")]
    UserNotFound,
    #[error("No report found")]
    ReportNotFound,
    #[error("Invalid password")]
    InvalidCredentials,
    #[error("{0}")]
    Storage(String),
}

impl Error {
    pub fn missing_fields() -> Self {
        Error::Validation("Missing required fields".to_string())
    }

    pub fn storage(context: &str, err: anyhow::Error) -> Self {
        Error::Storage(format!("{context}: {err:#}"))
    }
}
