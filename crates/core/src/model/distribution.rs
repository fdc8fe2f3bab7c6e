use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum DecileError {
    #[error("accuracy must be within 0..=100, got {0}")]
    OutOfRange(f64),
}

/// Number of buckets in the population histogram.
pub const DECILE_COUNT: usize = 10;

/// Lower bound of one of the ten accuracy buckets: 0, 10, ..., 90.
///
/// The top bucket is closed on both ends and covers `[90, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Decile(u8);

impl Decile {
    /// Buckets an accuracy percentage.
    ///
    /// # Errors
    ///
    /// Returns `DecileError::OutOfRange` for values below 0, above 100, or NaN.
    pub fn from_accuracy(percent: f64) -> Result<Self, DecileError> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(DecileError::OutOfRange(percent));
        }
        // 100 folds into the 90 bucket.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = ((percent / 10.0).floor() as u8).min(9);
        Ok(Self(index * 10))
    }

    /// # Panics
    ///
    /// Panics if `index >= DECILE_COUNT`.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        assert!(index < DECILE_COUNT, "decile index out of range: {index}");
        #[allow(clippy::cast_possible_truncation)]
        let lower = (index * 10) as u8;
        Self(lower)
    }

    pub fn all() -> impl Iterator<Item = Decile> {
        (0..DECILE_COUNT).map(Self::from_index)
    }

    #[must_use]
    pub fn lower(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn upper(self) -> u8 {
        if self.0 == 90 { 100 } else { self.0 + 9 }
    }

    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0 / 10)
    }
}

impl fmt::Display for Decile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.lower(), self.upper())
    }
}

/// One row of the histogram as shown to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionEntry {
    pub range: String,
    pub count: u64,
    pub percent_of_players: u32,
}

/// Snapshot of the population accuracy histogram.
///
/// Buckets and total are read independently, so under concurrent writes the
/// percentages may not sum to exactly 100.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    #[serde(rename = "distribution")]
    pub entries: Vec<DistributionEntry>,
    #[serde(rename = "totalGames")]
    pub total_samples: u64,
}

impl Distribution {
    #[must_use]
    pub fn from_counts(counts: [u64; DECILE_COUNT], total_samples: u64) -> Self {
        let entries = Decile::all()
            .zip(counts)
            .map(|(decile, count)| DistributionEntry {
                range: decile.to_string(),
                count,
                percent_of_players: percent_of(count, total_samples),
            })
            .collect();
        Self {
            entries,
            total_samples,
        }
    }

    /// The zero-state shown when the backend cannot be read.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entry(&self, decile: Decile) -> Option<&DistributionEntry> {
        self.entries.get(decile.index())
    }
}

fn percent_of(count: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = count as f64 / total as f64 * 100.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let rounded = pct.round() as u32;
    rounded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_by_floor_with_inclusive_top() {
        assert_eq!(Decile::from_accuracy(0.0).unwrap().to_string(), "0-9");
        assert_eq!(Decile::from_accuracy(9.99).unwrap().lower(), 0);
        assert_eq!(Decile::from_accuracy(55.0).unwrap().to_string(), "50-59");
        assert_eq!(Decile::from_accuracy(89.5).unwrap().lower(), 80);
        assert_eq!(Decile::from_accuracy(90.0).unwrap().lower(), 90);
        assert_eq!(Decile::from_accuracy(100.0).unwrap().to_string(), "90-100");
    }

    #[test]
    fn rejects_out_of_range() {
        for bad in [-1.0, 101.0, -0.01, 100.01, f64::NAN, f64::INFINITY] {
            assert!(Decile::from_accuracy(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn all_yields_ten_ordered_buckets() {
        let labels: Vec<String> = Decile::all().map(|d| d.to_string()).collect();
        assert_eq!(labels.len(), DECILE_COUNT);
        assert_eq!(labels.first().map(String::as_str), Some("0-9"));
        assert_eq!(labels[5], "50-59");
        assert_eq!(labels.last().map(String::as_str), Some("90-100"));
        for (i, decile) in Decile::all().enumerate() {
            assert_eq!(decile.index(), i);
        }
    }

    #[test]
    fn percentages_round_and_guard_zero_total() {
        let empty = Distribution::from_counts([0; DECILE_COUNT], 0);
        assert_eq!(empty.entries.len(), DECILE_COUNT);
        assert!(empty.entries.iter().all(|e| e.percent_of_players == 0));

        let mut counts = [0; DECILE_COUNT];
        counts[0] = 1;
        counts[5] = 2;
        let dist = Distribution::from_counts(counts, 3);
        assert_eq!(dist.entries[0].percent_of_players, 33);
        assert_eq!(dist.entries[5].percent_of_players, 67);
        assert_eq!(dist.entry(Decile::from_index(5)).map(|e| e.count), Some(2));
    }

    #[test]
    fn serializes_with_wire_names() {
        let mut counts = [0; DECILE_COUNT];
        counts[9] = 4;
        let json = serde_json::to_value(Distribution::from_counts(counts, 4)).unwrap();
        assert_eq!(json["totalGames"], 4);
        assert_eq!(json["distribution"][9]["range"], "90-100");
        assert_eq!(json["distribution"][9]["percentOfPlayers"], 100);
    }
}
