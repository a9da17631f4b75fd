//! Prelude module for convenient imports
//!
//! ```rust
//! use battle_core::prelude::*;
//! ```

// Core types
pub use crate::types::{AttackEffect, AttackSource, AttackTargeting, PartyId, UnitId, Winner};

// Roster
pub use crate::roster::{AttackInfo, Item, Party, UnitCatalog, UnitInstance, UnitType};

// Battle
pub use crate::action::{Action, ActionKind};
pub use crate::combat::{ActionResult, Battle, BattleState, EffectDelta, TurnResult};
pub use crate::error::{BattleError, RuleViolation, ValidationError};

// Queue strategies
pub use crate::queue::{IdentityOrder, QueueRandomizer, ShuffleTies};

// Config
pub use crate::config::{default_catalog, BattleConstants};
