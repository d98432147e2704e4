//! Plain-text response bodies

use crate::error::SdkError;
use std::str::FromStr;

/// Status reported by a helper's `<name>/status` route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Running,
    Stopped,
}

impl FromStr for ComponentStatus {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "RUNNING" => Ok(ComponentStatus::Running),
            "STOPPED" => Ok(ComponentStatus::Stopped),
            other => Err(SdkError::UnexpectedResponse(other.to_string())),
        }
    }
}

/// `TRUE` / `FALSE` as written by the is-connected route
pub(crate) fn parse_flag(body: &str) -> Result<bool, SdkError> {
    match body.trim() {
        "TRUE" => Ok(true),
        "FALSE" => Ok(false),
        other => Err(SdkError::UnexpectedResponse(other.to_string())),
    }
}
