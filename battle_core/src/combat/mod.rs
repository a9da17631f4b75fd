//! Combat - the battle state machine and what it reports

mod battle;
mod result;
mod snapshot;

pub use battle::{Battle, BattleState};
pub use result::{ActionRecord, ActionResult, AttackRoll, EffectDelta, TurnResult};
pub use snapshot::BattleSnapshot;
