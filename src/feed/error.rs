use std::result;

use thiserror::Error;

/// A direction code in the feed that is neither `1` nor `2`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown journey direction code: {0}")]
pub struct UnknownDirectionCode(pub u8);

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Fetch(reqwest::Error),

    #[error("feed response could not be parsed: {0}")]
    Parse(serde_json::Error),

    #[error("feed url could not be built: {0}")]
    UrlParse(String),

    #[error("no departure data available yet")]
    NoDataAvailable,
}

pub(crate) type Result<T> = result::Result<T, FeedError>;
