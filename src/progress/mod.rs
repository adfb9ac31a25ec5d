//! Badge and challenge evaluation
//!
//! Stateless derivation of achievement state from one contributor's
//! counters. Both evaluators are pure functions invoked freshly on each
//! data refresh; nothing in here persists or mutates anything.

mod badges;
mod challenges;

pub use badges::{builtin_badges, evaluate, BadgeDefinition, BadgeStatus};
pub use challenges::{
    challenge_progress, default_challenges, ChallengeDefinition, ChallengeStatus,
};
