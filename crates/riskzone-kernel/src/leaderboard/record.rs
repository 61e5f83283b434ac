//! Score records and their wire projection.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A validated score that has not been persisted yet.
///
/// Only [`ScoreSubmission::validate`](super::ScoreSubmission::validate)
/// produces values that satisfy the field bounds; stores trust them as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScore {
    pub name: String,
    pub score: u32,
    pub level: u32,
    pub character: Option<String>,
}

/// A persisted score.
///
/// Records are immutable once a store hands them out: `id` and `created_at`
/// are assigned by the store at insertion time and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Store-assigned identifier, never reused.
    pub id: u64,
    pub name: String,
    pub score: u32,
    pub level: u32,
    pub character: Option<String>,
    /// Insertion time, non-decreasing in insertion order.
    pub created_at: DateTime<Utc>,
}

impl ScoreRecord {
    /// Attach store-assigned identity to a validated score.
    pub fn from_new(id: u64, score: NewScore, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: score.name,
            score: score.score,
            level: score.level,
            character: score.character,
            created_at,
        }
    }
}

/// Public shape of one leaderboard row.
///
/// `playerName` duplicates `name` for clients that read the other field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub name: String,
    pub player_name: String,
    pub score: u32,
    pub level: u32,
    pub character: Option<String>,
    /// ISO-8601 UTC timestamp.
    pub created_at: String,
}

impl From<&ScoreRecord> for ScoreEntry {
    fn from(record: &ScoreRecord) -> Self {
        Self {
            name: record.name.clone(),
            player_name: record.name.clone(),
            score: record.score,
            level: record.level,
            character: record.character.clone(),
            created_at: record
                .created_at
                .to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

impl From<ScoreRecord> for ScoreEntry {
    fn from(record: ScoreRecord) -> Self {
        Self::from(&record)
    }
}
