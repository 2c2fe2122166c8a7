use std::path::PathBuf;
use thiserror::Error;

/// Which end of the clip range a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::End => write!(f, "end"),
        }
    }
}

/// Errors from parsing a single `[HH:]MM:SS[.fraction]` timestamp
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeParseError {
    /// The string does not match the expected shape
    #[error("invalid time format \"{input}\", expected [HH:]MM:SS[.fraction]")]
    Format { input: String },

    /// A field parsed but is outside its allowed range
    #[error("{field} out of range in \"{input}\"")]
    Range { field: &'static str, input: String },
}

/// Main error type for clipthat operations
#[derive(Error, Debug)]
pub enum ClipError {
    /// Bad CLI combination or missing source file
    #[error("{0}")]
    InvalidArgs(String),

    /// A clip endpoint failed to parse
    #[error("in {endpoint} time - {source}")]
    InvalidTime {
        endpoint: Endpoint,
        #[source]
        source: TimeParseError,
    },

    /// End time is not after start time
    #[error("end time must be after start time")]
    EmptyRange,

    /// An endpoint lies past the end of the source video
    #[error("{endpoint} time {time} is past the end of the video")]
    PastEndOfVideo { endpoint: Endpoint, time: String },

    /// Clip exceeds the remote service's maximum length
    #[error("clip is {seconds:.1}s long - gfycat only supports clips up to {limit:.0}s")]
    ClipTooLong { seconds: f64, limit: f64 },

    /// ffmpeg or ffprobe failed
    #[error("external tool failed: {0}")]
    ExternalTool(String),

    /// The remote API returned an unexpected response shape
    #[error("gfycat API is currently unavailable: {0}")]
    ServiceUnavailable(String),

    /// The binary upload was rejected
    #[error("problem uploading to gfycat filedrop: {0}")]
    Upload(String),

    /// The remote encoder reported a failure
    #[error("gfycat failed to process the upload: {0}")]
    RemoteProcessing(String),

    /// The poll budget ran out before the remote encode finished
    #[error("gave up waiting for gfycat after {attempts} status checks")]
    PollTimeout { attempts: u32 },

    /// Credentials file does not exist
    #[error("config file \"{}\" is missing", .0.display())]
    ConfigMissing(PathBuf),

    /// Credentials file exists but could not be parsed
    #[error("config file is invalid: {0}")]
    ConfigInvalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] Box<ureq::Error>),
}

impl From<ureq::Error> for ClipError {
    fn from(err: ureq::Error) -> Self {
        ClipError::Http(Box::new(err))
    }
}

/// Result type alias for clipthat operations
pub type ClipResult<T> = std::result::Result<T, ClipError>;
