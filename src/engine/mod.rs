//! Learning engine and the pieces that observe or stop it.

pub mod agent;
pub mod cancel;
pub mod observers;

pub use agent::{
    Agent, EnginePhase, GOAL_REWARD, MULTI_AGENT_CONFIDENCE_STEP, Responder, RoundOutcome,
    RunSummary, SINGLE_AGENT_CONFIDENCE_STEP, SkipReason, StepOutcome,
};
pub use cancel::CancellationToken;
pub use observers::{EpisodeRecorder, ProgressObserver, StatsFileObserver};
