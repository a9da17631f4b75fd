//! BattleSnapshot - a structural copy of a battle for saving or inspection

use super::BattleState;
use crate::queue::TurnQueue;
use crate::roster::Roster;
use crate::types::Winner;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub round: u32,
    pub state: BattleState,
    pub winner: Option<Winner>,
    pub roster: Roster,
    pub queue: TurnQueue,
}

impl BattleSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
