use thiserror::Error;

/// Rejected user input. State is left untouched whenever one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ValidationError {
    #[error("Invalid amount: '{0}' (expected a positive whole number)")]
    InvalidAmount(String),
    #[error("Invalid date: '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Unknown category: '{0}'")]
    UnknownCategory(String),
    #[error("Budget cannot be negative: {0}")]
    NegativeBudget(i64),
    #[error("No expense with id {0}")]
    UnknownExpense(String),
}

/// Failure talking to the advice service. Never shown to the user verbatim.
#[derive(Debug, Error)]
pub(crate) enum AdviceError {
    #[error("no API key set (looked in ${0} and $API_KEY)")]
    MissingApiKey(String),
    #[error("request failed: {0}")]
    Transport(#[from] ureq::Error),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("an advice request is already in flight")]
    AlreadyInFlight,
}
