use thiserror::Error;

/// Failure of a single page fetch
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Network error fetching {url}: {cause}")]
    Network { url: String, cause: String },

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamHttp { status: u16, url: String },
}

impl FetchError {
    /// HTTP status carried by an upstream failure
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::UpstreamHttp { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// The markup could not be turned into a document at all
#[derive(Error, Debug)]
#[error("Parse error: {0}")]
pub struct ParseError(pub String);

/// A scrape that failed before normalization began
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Scrape of {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("Scrape of {url} failed: {source}")]
    Parse {
        url: String,
        #[source]
        source: ParseError,
    },
}

impl PipelineError {
    pub fn url(&self) -> &str {
        match self {
            PipelineError::Fetch { url, .. } | PipelineError::Parse { url, .. } => url,
        }
    }

    /// The fetch failure, if that is what stopped the scrape
    pub fn fetch_error(&self) -> Option<&FetchError> {
        match self {
            PipelineError::Fetch { source, .. } => Some(source),
            PipelineError::Parse { .. } => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum FundsError {
    #[error(transparent)]
    PipelineError(#[from] PipelineError),

    #[error("Fund not found at index {index} ({total} funds available)")]
    FundNotFound { index: usize, total: usize },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, FundsError>;
