//! Command handlers.

mod ask;
mod seed;
mod stats;

pub use ask::AskCommand;
pub use seed::SeedCommand;
pub use stats::StatsCommand;
