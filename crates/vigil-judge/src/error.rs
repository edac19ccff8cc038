use thiserror::Error;

/// Errors produced by the judge client.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("OPENROUTER_API_KEY is not set")]
    MissingApiKey,

    #[error("http client setup failed: {0}")]
    ClientSetup(String),

    #[error("judge request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("judge returned status {status}: {body}")]
    ApiStatus {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("judge response carried no content")]
    EmptyResponse,

    #[error("no JSON verdict found in judge output")]
    NoJsonInOutput,

    #[error("malformed verdict: {0}")]
    MalformedVerdict(String),

    #[error("verdict is missing dimension '{0}'")]
    MissingDimension(&'static str),
}

pub type JudgeResult<T> = Result<T, JudgeError>;
