use thiserror::Error;

/// Failure of a single lookup attempt.
///
/// Validation failures never reach this type; they are caught before any
/// request is issued (see `PostalCode::parse`).
#[derive(Debug, Error)]
pub enum LookupError {
    /// The service answered but had no entry for the code (empty or null
    /// results, or a non-OK service status)
    #[error("no matching address found")]
    NotFound,

    /// Network-level failure or non-2xx HTTP status
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body could not be parsed as the zipcloud contract
    #[error("malformed response body: {0}")]
    Parse(#[from] serde_json::Error),
}

impl LookupError {
    /// Localized message shown to the user. Diagnostic detail stays in the
    /// `Display` impl and the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound => "該当する住所が見つかりませんでした",
            Self::Transport(_) | Self::Parse(_) => {
                "住所の取得に失敗しました。ネットワーク接続を確認してください。"
            }
        }
    }
}

/// User-facing message for a rejected postal code
pub const INVALID_LENGTH_MESSAGE: &str = "郵便番号は7桁で入力してください";
