//! Turn orchestration: the hunter, the agent contract and the episode loop

pub mod agent;
pub mod episode;
pub mod hunter;

pub use agent::{uniform_kind_belief, Decision, HunterAgent, TurnView};
pub use episode::{Episode, EpisodeSummary, TurnReport};
pub use hunter::HunterState;
