//! The in-memory input to every query: events, roster, per-match minutes and match summaries, as
//! handed over by the collaborators that own them.

use std::fs::File;
use std::io;
use std::path::Path;

use rustc_hash::FxHashSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::{ActionEvent, PlayerId};
use crate::roster::{MatchSummary, Player, RosterMinutesEntry};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("{0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Invalid(#[from] InvalidSnapshot),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidSnapshot {
    #[error("duplicate player {0}")]
    DuplicatePlayer(PlayerId),

    #[error("duplicate match {0}")]
    DuplicateMatch(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub events: Vec<ActionEvent>,
    pub players: Vec<Player>,
    pub roster_minutes: Vec<RosterMinutesEntry>,
    pub matches: Vec<MatchSummary>,
}

impl Snapshot {
    /// Checks that players and matches are uniquely identified. Rankings rely on the order of
    /// [Snapshot::players], so a repeated player would be ranked against itself.
    pub fn validate(&self) -> Result<(), InvalidSnapshot> {
        let mut player_ids = FxHashSet::default();
        for player in &self.players {
            if !player_ids.insert(player.id.as_str()) {
                return Err(InvalidSnapshot::DuplicatePlayer(player.id.clone()));
            }
        }
        let mut match_ids = FxHashSet::default();
        for summary in &self.matches {
            if !match_ids.insert(summary.match_id.as_str()) {
                return Err(InvalidSnapshot::DuplicateMatch(summary.match_id.clone()));
            }
        }
        Ok(())
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.id == player_id)
    }

    /// Reads and validates a snapshot from a JSON file.
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = read_json(path)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

/// Reads a JSON-encoded type from a given file `path`.
pub fn read_json<D: DeserializeOwned>(path: impl AsRef<Path>) -> Result<D, SnapshotError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(io::BufReader::new(file))?)
}
