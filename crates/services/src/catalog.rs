//! Subject catalog: loading from the asset pipeline's JSON and per-session shuffling.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{SeedableRng, rng};
use serde::Deserialize;

use guess_core::model::{Office, Party, Subject, SubjectId};

use crate::error::CatalogError;

/// Returns `items` in random order.
///
/// With a seed the order is fully determined by it, which keeps tests stable.
#[must_use]
pub fn shuffle<T>(seed: Option<u64>, mut items: Vec<T>) -> Vec<T> {
    match seed {
        Some(seed) => items.shuffle(&mut StdRng::seed_from_u64(seed)),
        None => items.shuffle(&mut rng()),
    }
    items
}

/// Ordered, read-only list of subjects for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    subjects: Vec<Subject>,
}

impl Catalog {
    #[must_use]
    pub fn new(subjects: Vec<Subject>) -> Self {
        Self { subjects }
    }

    /// Shuffles once up front; the order then stays fixed for the session.
    #[must_use]
    pub fn shuffled(subjects: Vec<Subject>, seed: Option<u64>) -> Self {
        Self::new(shuffle(seed, subjects))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Subject at `position`, wrapping past the end. `None` only when empty.
    #[must_use]
    pub fn get_wrapped(&self, position: usize) -> Option<&Subject> {
        if self.subjects.is_empty() {
            return None;
        }
        self.subjects.get(position % self.subjects.len())
    }
}

/// Entry shape written by the data pipeline.
#[derive(Debug, Deserialize)]
struct RawSubject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    party: String,
    state: Option<String>,
    category: Option<String>,
    #[serde(alias = "image_url")]
    img: Option<String>,
}

/// Parse a catalog from the pipeline's JSON array.
///
/// Entries with a third party, a blank name, or a missing/invalid image are
/// skipped. Ids are assigned from 1 in file order among kept entries.
///
/// # Errors
///
/// Returns `CatalogError::Json` if the document is not an array of objects.
pub fn parse_catalog_json(json: &str) -> Result<Vec<Subject>, CatalogError> {
    let raw: Vec<RawSubject> = serde_json::from_str(json)?;
    let mut subjects = Vec::with_capacity(raw.len());

    for entry in raw {
        let Ok(party) = entry.party.parse::<Party>() else {
            log::debug!("skipping {:?}: unsupported party {:?}", entry.name, entry.party);
            continue;
        };
        let Some(img) = entry.img.as_deref() else {
            log::debug!("skipping {:?}: no image", entry.name);
            continue;
        };
        let next_id = SubjectId::new(subjects.len() as u64 + 1);
        match Subject::parse(next_id, entry.name.as_str(), img, party) {
            Ok(subject) => subjects.push(
                subject
                    .with_state(entry.state)
                    .with_office(entry.category.as_deref().and_then(Office::from_category)),
            ),
            Err(err) => log::debug!("skipping {:?}: {err}", entry.name),
        }
    }

    Ok(subjects)
}

/// Read and parse a catalog file.
///
/// # Errors
///
/// Returns `CatalogError::Io` if the file cannot be read, or `CatalogError::Json`
/// if it is malformed.
pub async fn load_catalog_json(path: impl AsRef<Path>) -> Result<Vec<Subject>, CatalogError> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path).await?;
    let subjects = parse_catalog_json(&json)?;
    log::info!("loaded {} subjects from {}", subjects.len(), path.display());
    Ok(subjects)
}
