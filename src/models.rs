use std::{fmt, str::FromStr};

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// How a toggle on a single candidate changes a ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectionMode {
    /// Toggling a new candidate adds it to the current selections.
    #[default]
    Multi,
    /// Toggling a new candidate replaces the current selections.
    Single,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionMode::Multi => f.write_str("multi"),
            SelectionMode::Single => f.write_str("single"),
        }
    }
}

impl FromStr for SelectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "multi" | "multiple" => Ok(SelectionMode::Multi),
            "single" => Ok(SelectionMode::Single),
            other => Err(format!("unknown selection mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub candidates: Vec<String>,
    pub owner_id: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Poll {
    pub fn has_candidate(&self, candidate: &str) -> bool {
        self.candidates.iter().any(|c| c == candidate)
    }
}

/// A poll that passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoll {
    pub title: String,
    pub description: Option<String>,
    pub candidates: Vec<String>,
    pub owner_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub poll_id: Uuid,
    pub participant_id: String,
    pub selections: Vec<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Ballot {
    pub fn is_abstention(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn has_selected(&self, candidate: &str) -> bool {
        self.selections.iter().any(|s| s == candidate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCount {
    pub candidate: String,
    pub count: i64,
}

/// Support per candidate, in the poll's candidate order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tally {
    pub poll_id: Uuid,
    pub counts: Vec<CandidateCount>,
    pub ballots: usize,
}

impl Tally {
    /// Count for `candidate`, `None` when it is not part of the poll.
    pub fn count_of(&self, candidate: &str) -> Option<i64> {
        self.counts
            .iter()
            .find(|c| c.candidate == candidate)
            .map(|c| c.count)
    }

    pub fn max_count(&self) -> i64 {
        self.counts.iter().map(|c| c.count).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Standings {
    #[serde(flatten)]
    pub poll: Poll,
    pub tally: Tally,
    pub winners: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct Message<'a>(pub &'a str);

impl<'a> Serialize for Message<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ts = serializer.serialize_struct("message", 1)?;
        ts.serialize_field("message", self.0)?;
        ts.end()
    }
}
