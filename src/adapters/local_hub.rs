//! In-process message exchange for agents running in one process.
//!
//! Every agent joins the hub and receives a [`LocalEndpoint`]. Requests are
//! broadcast to all other members as encoded frames; each reached peer
//! answers once, and the requester's rendezvous slot merges their records
//! into a single [`OpinionResponse`].

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex, MutexGuard,
        mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError},
    },
    time::{Duration, Instant},
};

use tracing::{debug, warn};

use crate::{
    Error, Result,
    identifiers::AgentId,
    ports::{Messenger, RequestHandler},
    protocol::{Message, OpinionRecord, OpinionRequest, OpinionResponse, codec},
};

type Registry = Arc<Mutex<HashMap<AgentId, Sender<String>>>>;

fn lock(registry: &Registry) -> Result<MutexGuard<'_, HashMap<AgentId, Sender<String>>>> {
    registry.lock().map_err(|_| Error::Transport {
        message: "hub registry lock poisoned".to_string(),
    })
}

/// Shared router. Cloning the hub shares the same membership.
///
/// # Examples
///
/// ```
/// use marl::adapters::LocalHub;
///
/// let hub = LocalHub::new();
/// let first = hub.join(1)?;
/// let second = hub.join(2)?;
/// assert_eq!(hub.members(), 2);
/// drop(first);
/// assert_eq!(hub.members(), 1);
/// # drop(second);
/// # Ok::<(), marl::Error>(())
/// ```
#[derive(Clone, Default)]
pub struct LocalHub {
    registry: Registry,
}

impl LocalHub {
    /// Responder id carried by merged responses.
    pub const ROUTER_ID: AgentId = AgentId::MAX;

    pub fn new() -> Self {
        Self::default()
    }

    /// Join as `agent_id`. Ids must be unique among current members.
    pub fn join(&self, agent_id: AgentId) -> Result<LocalEndpoint> {
        if agent_id == Self::ROUTER_ID {
            return Err(Error::InvalidConfiguration {
                message: format!("agent id {agent_id} is reserved for the hub"),
            });
        }
        let (sender, inbox) = mpsc::channel();
        let mut registry = lock(&self.registry)?;
        if registry.contains_key(&agent_id) {
            return Err(Error::InvalidConfiguration {
                message: format!("agent id {agent_id} already joined the hub"),
            });
        }
        registry.insert(agent_id, sender);
        Ok(LocalEndpoint {
            agent_id,
            registry: Arc::clone(&self.registry),
            inbox,
            pending: HashMap::new(),
            joined: true,
        })
    }

    /// Number of agents currently joined.
    pub fn members(&self) -> usize {
        lock(&self.registry).map_or(0, |registry| registry.len())
    }
}

#[derive(Debug, Default)]
struct Rendezvous {
    expected: Option<usize>,
    received: usize,
    opinions: Vec<OpinionRecord>,
}

impl Rendezvous {
    fn is_complete(&self) -> bool {
        self.expected.is_some_and(|expected| self.received >= expected)
    }
}

/// One agent's connection to a [`LocalHub`].
pub struct LocalEndpoint {
    agent_id: AgentId,
    registry: Registry,
    inbox: Receiver<String>,
    pending: HashMap<u32, Rendezvous>,
    joined: bool,
}

impl LocalEndpoint {
    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    fn reply(&self, response: OpinionResponse) -> Result<()> {
        let requester = response.requester_id;
        let frame = codec::encode(&Message::Response(response))?;
        let registry = lock(&self.registry)?;
        match registry.get(&requester) {
            Some(peer) if peer.send(frame).is_ok() => {}
            _ => debug!(agent = self.agent_id, requester, "requester left, reply dropped"),
        }
        Ok(())
    }

    fn dispatch(&mut self, frame: &str, handler: &dyn RequestHandler) -> Result<()> {
        let message = match codec::decode(frame) {
            Ok(message) => message,
            Err(e) => {
                warn!(agent = self.agent_id, error = %e, "discarding malformed frame");
                return Ok(());
            }
        };
        match message {
            Message::Request(request) => self.reply(handler.on_request(&request)),
            Message::Response(response) => {
                match self.pending.get_mut(&response.request_number) {
                    Some(slot) => {
                        slot.received += 1;
                        slot.opinions.extend(response.opinions);
                    }
                    None => debug!(
                        agent = self.agent_id,
                        request_number = response.request_number,
                        responder = response.agent_id,
                        "late response dropped"
                    ),
                }
                Ok(())
            }
        }
    }

    fn leave(&mut self) {
        if !self.joined {
            return;
        }
        self.joined = false;
        if let Ok(mut registry) = self.registry.lock() {
            registry.remove(&self.agent_id);
        }
    }
}

impl Messenger for LocalEndpoint {
    fn register(&mut self, request_number: u32) {
        self.pending.insert(request_number, Rendezvous::default());
    }

    fn send(&mut self, request: &OpinionRequest) -> Result<()> {
        let frame = codec::encode(&Message::Request(*request))?;
        let reached = {
            let registry = lock(&self.registry)?;
            registry
                .iter()
                .filter(|&(&id, _)| id != self.agent_id)
                .filter(|(_, peer)| peer.send(frame.clone()).is_ok())
                .count()
        };
        debug!(
            agent = self.agent_id,
            request_number = request.request_number,
            reached,
            "opinion request sent"
        );
        self.pending
            .entry(request.request_number)
            .or_default()
            .expected = Some(reached);
        Ok(())
    }

    fn await_response(
        &mut self,
        request_number: u32,
        timeout: Duration,
        handler: &dyn RequestHandler,
    ) -> Result<OpinionResponse> {
        let deadline = Instant::now() + timeout;
        loop {
            let Some(slot) = self.pending.get(&request_number) else {
                return Err(Error::Transport {
                    message: format!("no rendezvous registered for request {request_number}"),
                });
            };
            if slot.is_complete() {
                let slot = self.pending.remove(&request_number).unwrap_or_default();
                return Ok(OpinionResponse {
                    agent_id: LocalHub::ROUTER_ID,
                    requester_id: self.agent_id,
                    request_number,
                    opinions: slot.opinions,
                });
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                let slot = self.pending.remove(&request_number).unwrap_or_default();
                return Err(Error::ResponseTimeout {
                    request_number,
                    received: slot.received,
                    expected: slot.expected.unwrap_or(0),
                });
            }

            match self.inbox.recv_timeout(remaining) {
                Ok(frame) => self.dispatch(&frame, handler)?,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(Error::Transport {
                        message: format!("agent {} is no longer joined", self.agent_id),
                    });
                }
            }
        }
    }

    fn shutdown(&mut self, handler: &dyn RequestHandler) -> Result<()> {
        // Leave first so no new request can arrive after the drain.
        self.leave();
        let mut answered = 0;
        loop {
            match self.inbox.try_recv() {
                Ok(frame) => {
                    self.dispatch(&frame, handler)?;
                    answered += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        self.pending.clear();
        debug!(agent = self.agent_id, drained = answered, "left hub");
        Ok(())
    }
}

impl Drop for LocalEndpoint {
    fn drop(&mut self) {
        self.leave();
    }
}
