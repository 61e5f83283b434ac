//! Inbound score submissions.
//!
//! A [`ScoreSubmission`] is the raw client payload. Clients disagree on what
//! to call the player name, so when `name` is blank the fields listed in
//! [`NAME_ALIASES`] are tried in order. [`ScoreSubmission::validate`] turns a
//! submission into a [`NewScore`] or rejects it without side effects.

use super::error::{LeaderboardError, LeaderboardResult};
use super::record::NewScore;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

/// Maximum player name length, in characters, after trimming.
pub const NAME_MAX_LEN: usize = 16;
/// Maximum character name length, in characters, after trimming.
pub const CHARACTER_MAX_LEN: usize = 24;
/// Hard upper bound of a score.
pub const SCORE_MAX: u32 = 999_999;
/// Hard upper bound of a level.
pub const LEVEL_MAX: u32 = 999;
/// Alternate name fields, in preference order.
pub const NAME_ALIASES: [&str; 4] = ["playerName", "player_name", "player", "username"];

/// Raw score payload as sent by clients.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScoreSubmission {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "integral")]
    pub score: Option<i64>,
    #[serde(default, deserialize_with = "integral")]
    pub level: Option<i64>,
    #[serde(default)]
    pub character: Option<String>,
    /// Every other field, including the name aliases.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accept any JSON number without a fractional part, so `10.0` reads as `10`.
fn integral<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(n) = number.as_i64() {
        return Ok(Some(n));
    }
    match number.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(Some(f as i64))
        }
        _ => Err(D::Error::custom(format!("expected an integer, got {number}"))),
    }
}

impl ScoreSubmission {
    pub fn new(name: impl Into<String>, score: i64) -> Self {
        Self {
            name: Some(Value::String(name.into())),
            score: Some(score),
            ..Default::default()
        }
    }

    /// Submission that only carries its name under an alias field.
    pub fn aliased(alias: &str, name: impl Into<String>, score: i64) -> Self {
        let mut extra = Map::new();
        extra.insert(alias.to_string(), Value::String(name.into()));
        Self {
            score: Some(score),
            extra,
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: i64) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_character(mut self, character: impl Into<String>) -> Self {
        self.character = Some(character.into());
        self
    }

    /// The first non-blank trimmed name among `name` and its aliases.
    pub fn resolve_name(&self) -> Option<String> {
        std::iter::once(self.name.as_ref())
            .chain(NAME_ALIASES.iter().map(|alias| self.extra.get(*alias)))
            .flatten()
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Check every field bound, then the anti-abuse `ceiling`.
    ///
    /// Field violations yield [`LeaderboardError::Validation`]; a score above
    /// `ceiling` yields [`LeaderboardError::ScoreOutOfRange`].
    pub fn validate(&self, ceiling: u32) -> LeaderboardResult<NewScore> {
        let name = self
            .resolve_name()
            .ok_or_else(|| LeaderboardError::validation("name is required"))?;
        if name.chars().count() > NAME_MAX_LEN {
            return Err(LeaderboardError::validation(format!(
                "name must be at most {NAME_MAX_LEN} characters"
            )));
        }

        let score = self
            .score
            .ok_or_else(|| LeaderboardError::validation("score is required"))?;
        let score = u32::try_from(score)
            .ok()
            .filter(|s| *s <= SCORE_MAX)
            .ok_or_else(|| {
                LeaderboardError::validation(format!("score must be between 0 and {SCORE_MAX}"))
            })?;

        let level = self.level.unwrap_or(1);
        let level = u32::try_from(level)
            .ok()
            .filter(|l| (1..=LEVEL_MAX).contains(l))
            .ok_or_else(|| {
                LeaderboardError::validation(format!("level must be between 1 and {LEVEL_MAX}"))
            })?;

        let character = match self.character.as_deref().map(str::trim) {
            None => None,
            Some(c) if c.is_empty() || c.chars().count() > CHARACTER_MAX_LEN => {
                return Err(LeaderboardError::validation(format!(
                    "character must be between 1 and {CHARACTER_MAX_LEN} characters"
                )));
            }
            Some(c) => Some(c.to_string()),
        };

        if score > ceiling {
            return Err(LeaderboardError::ScoreOutOfRange { score, ceiling });
        }

        Ok(NewScore {
            name,
            score,
            level,
            character,
        })
    }
}
