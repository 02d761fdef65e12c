//! Inline keyboard callback payloads.
//!
//! Buttons carry an opaque string token; on the wire a selection is
//! `anime_<id>` with a decimal id.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix of the "select anime" token
pub const SELECT_ANIME_PREFIX: &str = "anime_";

/// Action requested by an inline button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackPayload {
    /// Show details for the catalog id
    SelectAnime(u32),
}

/// Why a callback token could not be decoded
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CallbackError {
    /// Token does not belong to this bot
    #[error("Unknown callback data: {0}")]
    UnknownAction(String),
    /// Recognised action with a non-numeric id
    #[error("Invalid anime id in callback: {0}")]
    InvalidId(String),
}

impl fmt::Display for CallbackPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelectAnime(id) => write!(f, "{SELECT_ANIME_PREFIX}{id}"),
        }
    }
}

impl FromStr for CallbackPayload {
    type Err = CallbackError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let Some(raw_id) = data.strip_prefix(SELECT_ANIME_PREFIX) else {
            return Err(CallbackError::UnknownAction(data.to_string()));
        };
        raw_id
            .parse::<u32>()
            .map(Self::SelectAnime)
            .map_err(|_| CallbackError::InvalidId(raw_id.to_string()))
    }
}
