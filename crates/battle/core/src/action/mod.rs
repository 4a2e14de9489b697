//! Action definitions, intents and their resolution.

mod attack;
mod intent;
pub mod resolver;

pub use attack::Attack;
pub use intent::{ActionIntent, InputRequest};
pub use resolver::{HitOutcome, Resolution, apply_hit, compute_damage, resolve_action, resolve_echo};
