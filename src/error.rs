use thiserror::Error;

/// Rejections raised while turning raw CLI or HTTP input into `LoanInputs`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{flag} must be a finite number")]
    NotFinite { flag: &'static str },

    #[error("{flag} must be > 0")]
    NotPositive { flag: &'static str },

    #[error("{flag} must be >= 0")]
    Negative { flag: &'static str },

    #[error("{flag} must be <= {max}")]
    TooLarge { flag: &'static str, max: f64 },

    #[error("{flag} must be > -100")]
    TotalLoss { flag: &'static str },

    #[error("--down-payment cannot exceed --home-price")]
    DownPaymentExceedsPrice,

    #[error("--start-date '{value}' is not a valid YYYY-MM-DD date")]
    InvalidStartDate { value: String },
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}
