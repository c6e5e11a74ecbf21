//! Opinion exchange messages.

use serde::{Deserialize, Serialize};

use crate::identifiers::{ActionId, AgentId, StateId};

/// One agent's estimate for a state-action pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpinionRecord {
    pub state: StateId,
    pub action: ActionId,
    pub q_value: f64,
    pub confidence: f64,
}

impl OpinionRecord {
    pub fn new(state: StateId, action: ActionId, q_value: f64, confidence: f64) -> Self {
        Self {
            state,
            action,
            q_value,
            confidence,
        }
    }
}

/// Question broadcast to peers: what do you know about `state`?
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpinionRequest {
    pub agent_id: AgentId,
    /// Strictly increasing per requesting agent.
    pub request_number: u32,
    pub state: StateId,
    /// Requester's own confidence for the state (its visit count).
    pub confidence: f64,
}

/// Answer to an [`OpinionRequest`], echoing its request number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionResponse {
    pub agent_id: AgentId,
    pub requester_id: AgentId,
    pub request_number: u32,
    pub opinions: Vec<OpinionRecord>,
}

impl OpinionResponse {
    /// Empty answer to `request` from `agent_id`.
    pub fn answering(request: &OpinionRequest, agent_id: AgentId) -> Self {
        Self {
            agent_id,
            requester_id: request.agent_id,
            request_number: request.request_number,
            opinions: Vec::new(),
        }
    }
}

/// Everything that travels between agents, discriminated by an explicit
/// `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Request(OpinionRequest),
    Response(OpinionResponse),
}
