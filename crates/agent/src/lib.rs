//! Turn orchestration
//!
//! The agent owns the per-turn pipeline: validate the room, select
//! conversation context, retrieve passages when a document is attached,
//! score spoken turns, call the generation backend, and persist both sides
//! of the exchange. Tolerated upstream failures (assessment, pitch,
//! synthesis) degrade the turn instead of failing it.

pub mod agent;
pub mod history;
pub mod turn;

pub use agent::{AgentConfig, Collaborators, DocumentSummary, TutorAgent};
pub use history::ContextSelector;
pub use turn::{Degradation, TextTurnReply, TurnStatus, VoiceTurnReply};
