//! battle_core - Turn-based battle round engine
//!
//! This library provides:
//! - Roster & UnitCatalog: unit type definitions and the two live parties
//! - TurnQueue: initiative-ordered act order with a pluggable randomizer
//! - Action resolution: validation of caller-submitted actions
//! - Attack resolution: targeting, accuracy rolls, immunities and shields
//! - Effect engine: damage, statuses, transformation, summoning
//! - Battle: the round/turn state machine emitting TurnResults

pub mod action;
pub mod attack;
pub mod combat;
pub mod config;
pub mod effect;
pub mod error;
pub mod prelude;
pub mod queue;
pub mod roster;
pub mod status;
pub mod types;

// Re-export core types for convenience
pub use action::{Action, ActionKind};
pub use combat::{
    ActionRecord, ActionResult, AttackRoll, Battle, BattleSnapshot, BattleState, EffectDelta,
    TurnResult,
};
pub use config::{default_catalog, BattleConstants, ConfigError};
pub use error::{BattleError, InvariantViolation, RuleViolation, ValidationError};
pub use queue::{IdentityOrder, QueueRandomizer, QueueState, ShuffleTies, TurnQueue};
pub use roster::{AttackInfo, Item, Party, Roster, UnitCatalog, UnitInstance, UnitType};
pub use status::{Status, StatusKind, StatusSet};
pub use types::{
    AttackEffect, AttackSlot, AttackSource, AttackTargeting, ItemType, PartyId, UnitId, Winner,
};
