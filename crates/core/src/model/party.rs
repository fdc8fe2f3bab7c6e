use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown party: {0:?}")]
pub struct ParsePartyError(pub String);

/// The two mutually exclusive labels a subject can carry.
///
/// `Democrat` is the left-hand choice and `Republican` the right-hand one; swipe
/// gestures resolve to them by direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    Democrat,
    Republican,
}

impl Party {
    pub const ALL: [Party; 2] = [Party::Democrat, Party::Republican];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Party::Democrat => "Democrat",
            Party::Republican => "Republican",
        }
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Party::Democrat => Party::Republican,
            Party::Republican => Party::Democrat,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Party {
    type Err = ParsePartyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "democrat" | "democratic" | "dem" | "d" => Ok(Party::Democrat),
            "republican" | "rep" | "gop" | "r" => Ok(Party::Republican),
            _ => Err(ParsePartyError(s.to_owned())),
        }
    }
}
