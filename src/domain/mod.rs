//! Core domain types for EcoLens

mod time;
mod user;

pub use time::{format_number, format_time_ago};
pub use user::{ProgressDelta, UserId, UserProgress};
