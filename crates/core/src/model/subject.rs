use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::{Party, SubjectId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject name must not be empty")]
    EmptyName,
    #[error("invalid image reference {raw:?}: {reason}")]
    InvalidImage { raw: String, reason: String },
}

/// Office held by a subject, carried through from the catalog for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Office {
    Senate,
    House,
    #[serde(alias = "gov")]
    Governor,
}

impl Office {
    /// Maps the catalog's `category` field; unknown values yield `None`.
    #[must_use]
    pub fn from_category(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "senate" | "sen" => Some(Office::Senate),
            "house" | "rep" => Some(Office::House),
            "gov" | "governor" => Some(Office::Governor),
            _ => None,
        }
    }
}

/// One item to be guessed: a public figure with a known party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    id: SubjectId,
    name: String,
    image: Url,
    party: Party,
    state: Option<String>,
    office: Option<Office>,
}

impl Subject {
    /// # Errors
    ///
    /// Returns `SubjectError::EmptyName` if `name` is blank.
    pub fn new(
        id: SubjectId,
        name: impl Into<String>,
        image: Url,
        party: Party,
    ) -> Result<Self, SubjectError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(SubjectError::EmptyName);
        }
        Ok(Self {
            id,
            name,
            image,
            party,
            state: None,
            office: None,
        })
    }

    /// Like [`Subject::new`] but parses the image reference.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError::InvalidImage` if `image` is not an absolute URI,
    /// or `SubjectError::EmptyName` for a blank name.
    pub fn parse(
        id: SubjectId,
        name: impl Into<String>,
        image: &str,
        party: Party,
    ) -> Result<Self, SubjectError> {
        let image = Url::parse(image.trim()).map_err(|err| SubjectError::InvalidImage {
            raw: image.to_owned(),
            reason: err.to_string(),
        })?;
        Self::new(id, name, image, party)
    }

    #[must_use]
    pub fn with_state(mut self, state: Option<String>) -> Self {
        self.state = state
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty());
        self
    }

    #[must_use]
    pub fn with_office(mut self, office: Option<Office>) -> Self {
        self.office = office;
        self
    }

    #[must_use]
    pub fn id(&self) -> SubjectId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn image(&self) -> &Url {
        &self.image
    }

    #[must_use]
    pub fn party(&self) -> Party {
        self.party
    }

    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    #[must_use]
    pub fn office(&self) -> Option<Office> {
        self.office
    }
}
