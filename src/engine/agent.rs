//! Learning engine
//!
//! One [`Agent`] drives one learner through the problem. The operation and
//! learning modes select the loop once, at the start of [`Agent::run`]:
//!
//! | Phase | Selection | Update |
//! |-------|-----------|--------|
//! | `SingleLearn` | softmax over the local Q-values | yes |
//! | `SingleExploit` | greedy over the local Q-values | no |
//! | `MultiLearn` | softmax over the peer consensus | yes |
//!
//! A reward of exactly `1.0` marks the goal: the episode is recorded and the
//! agent jumps back to a start state.

use std::sync::Arc;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing::{debug, error, info, trace, warn};

use crate::{
    Error, Result,
    app::{AgentConfig, LearningMode, OperationMode},
    consensus,
    engine::{cancel::CancellationToken, observers::StatsFileObserver},
    identifiers::{AgentId, StateId},
    mdp::{Action, Mdp, State},
    policy::BoltzmannPolicy,
    ports::{Messenger, Observer, RequestHandler},
    protocol::{OpinionRecord, OpinionRequest, OpinionResponse},
    q_learning::{LearningParameters, QStore, VisitCounter, q_learning_target},
};

/// Confidence added to an entry per update when learning alone.
pub const SINGLE_AGENT_CONFIDENCE_STEP: f64 = 0.01;

/// Confidence added per update when the choice was informed by peers.
pub const MULTI_AGENT_CONFIDENCE_STEP: f64 = 0.1;

/// Reward that marks reaching the goal.
pub const GOAL_REWARD: f64 = 1.0;

#[allow(clippy::float_cmp)]
fn is_goal(reward: f64) -> bool {
    reward == GOAL_REWARD
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    Initializing,
    SingleLearn,
    SingleExploit,
    MultiLearn,
    Terminal,
}

impl EnginePhase {
    /// Loop phase for a mode combination. Multi-agent exploitation has no
    /// loop and is rejected.
    pub fn select(operation: OperationMode, learning: LearningMode) -> Result<Self> {
        match (operation, learning) {
            (OperationMode::Single, LearningMode::Learn) => Ok(Self::SingleLearn),
            (OperationMode::Single, LearningMode::Exploit) => Ok(Self::SingleExploit),
            (OperationMode::Multi, LearningMode::Learn) => Ok(Self::MultiLearn),
            (OperationMode::Multi, LearningMode::Exploit) => Err(Error::InvalidConfiguration {
                message: "exploit mode is not allowed in multi-agent operation".to_string(),
            }),
        }
    }
}

/// Result of applying one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continued,
    EpisodeCompleted { episode: u64, steps: u64 },
    /// The current state had no actions; the agent was moved to a start
    /// state without recording an episode.
    DeadEnd,
}

/// Why a consensus round made no progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    SendFailed,
    NoResponse,
    RequestMismatch,
    UnknownAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    Acted(StepOutcome),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub agent_id: AgentId,
    pub phase: EnginePhase,
    pub episodes: u64,
    pub steps: u64,
    pub skipped_rounds: u64,
    pub cancelled: bool,
}

/// Read-only view of a Q-store answering peer requests.
pub struct Responder<'a> {
    agent_id: AgentId,
    store: &'a QStore,
}

impl<'a> Responder<'a> {
    pub fn new(agent_id: AgentId, store: &'a QStore) -> Self {
        Self { agent_id, store }
    }
}

impl RequestHandler for Responder<'_> {
    fn on_request(&self, request: &OpinionRequest) -> OpinionResponse {
        let mut response = OpinionResponse::answering(request, self.agent_id);
        response.opinions = self
            .store
            .entries_for_state(request.state)
            .map(|entry| {
                OpinionRecord::new(entry.state, entry.action, entry.value, entry.confidence)
            })
            .collect();
        trace!(
            agent = self.agent_id,
            requester = request.agent_id,
            state = %request.state,
            opinions = response.opinions.len(),
            "answered opinion request"
        );
        response
    }
}

pub struct Agent {
    mdp: Arc<Mdp>,
    config: AgentConfig,
    params: LearningParameters,
    policy: BoltzmannPolicy,
    q_store: QStore,
    visits: VisitCounter,
    rng: StdRng,
    phase: EnginePhase,
    current: StateId,
    request_sequence: u32,
    completed_episodes: u64,
    episode_steps: u64,
    total_steps: u64,
    skipped_rounds: u64,
    observers: Vec<Box<dyn Observer>>,
    cancel: CancellationToken,
}

impl Agent {
    /// Create an agent for `mdp`. The Q-store is initialized immediately.
    /// A configured statistics path gets a [`StatsFileObserver`].
    ///
    /// # Errors
    ///
    /// Fails when the configuration is invalid, the problem has no actions,
    /// or the configured start state is out of range or has no actions.
    pub fn new(mdp: Arc<Mdp>, config: AgentConfig) -> Result<Self> {
        config.validate()?;
        if mdp.action_count() == 0 {
            return Err(Error::InvalidConfiguration {
                message: "problem has no actions".to_string(),
            });
        }
        if let Some(index) = config.start {
            let state = mdp.state_at(index).ok_or(Error::StartStateOutOfRange {
                index,
                count: mdp.state_count(),
            })?;
            if state.is_dead_end() {
                return Err(Error::InvalidConfiguration {
                    message: format!("start state {} has no actions", state.id()),
                });
            }
        }

        let policy = BoltzmannPolicy::new(config.temperature)?;
        let params = LearningParameters::new(config.learning_rate, config.discount_factor);
        let rng = build_rng(config.seed);
        let mut observers: Vec<Box<dyn Observer>> = Vec::new();
        if let Some(path) = &config.stats_path {
            observers.push(Box::new(StatsFileObserver::new(path)));
        }
        let mut agent = Self {
            mdp,
            config,
            params,
            policy,
            q_store: QStore::new(),
            visits: VisitCounter::new(),
            rng,
            phase: EnginePhase::Initializing,
            current: StateId::default(),
            request_sequence: 0,
            completed_episodes: 0,
            episode_steps: 0,
            total_steps: 0,
            skipped_rounds: 0,
            observers,
            cancel: CancellationToken::new(),
        };
        agent.initialize();
        Ok(agent)
    }

    /// Add an observer to the agent
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Share a stop signal with a controller.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn id(&self) -> AgentId {
        self.config.agent_id
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn mdp(&self) -> &Mdp {
        &self.mdp
    }

    pub fn q_store(&self) -> &QStore {
        &self.q_store
    }

    pub fn visits(&self) -> &VisitCounter {
        &self.visits
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn current_state(&self) -> StateId {
        self.current
    }

    pub fn completed_episodes(&self) -> u64 {
        self.completed_episodes
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Rebuild the Q-store and visit counts and move to a start state.
    ///
    /// A configured policy input is overlaid onto the fresh table.
    pub fn initialize(&mut self) {
        self.phase = EnginePhase::Initializing;
        self.q_store = QStore::from_mdp(&self.mdp);
        if let Some(path) = &self.config.policy_input {
            let saved = QStore::load(path);
            let copied = self.q_store.overlay(&saved);
            info!(
                agent = self.config.agent_id,
                path = %path.display(),
                copied,
                "loaded policy"
            );
        }
        self.visits.clear();
        self.completed_episodes = 0;
        self.episode_steps = 0;
        self.total_steps = 0;
        self.skipped_rounds = 0;
        self.current = self.start_state();
    }

    fn start_state(&mut self) -> StateId {
        let index = match self.config.start {
            Some(index) => index,
            None => self.rng.random_range(0..self.mdp.state_count()),
        };
        self.mdp.state_at(index).map(State::id).unwrap_or_default()
    }

    fn current_state_ref<'m>(&self, mdp: &'m Mdp) -> Result<&'m State> {
        mdp.state(self.current).ok_or(Error::UnknownState {
            state: self.current,
        })
    }

    fn should_continue(&self) -> bool {
        if self.cancel.is_cancelled() || self.completed_episodes >= self.config.episodes {
            return false;
        }
        self.config
            .max_steps
            .is_none_or(|max_steps| self.total_steps < max_steps)
    }

    /// Run the loop selected by the configured modes until the episode count
    /// is reached, the step limit is hit, or the run is cancelled.
    ///
    /// Statistics are flushed, the learned table is saved and the messenger
    /// is shut down even when the loop stops on an error; that error is
    /// returned afterwards.
    pub fn run(&mut self, messenger: Option<&mut dyn Messenger>) -> Result<RunSummary> {
        let mode = EnginePhase::select(self.config.operation_mode, self.config.learning_mode)?;
        if mode == EnginePhase::MultiLearn && messenger.is_none() {
            return Err(Error::InvalidConfiguration {
                message: "multi-agent operation needs a messenger".to_string(),
            });
        }

        self.initialize();
        self.execute(mode, messenger)
    }

    /// Loop and shutdown sequence over the current table and state.
    fn execute(
        &mut self,
        mode: EnginePhase,
        mut messenger: Option<&mut dyn Messenger>,
    ) -> Result<RunSummary> {
        self.notify(|observer, episodes| observer.on_run_start(episodes));
        self.phase = mode;
        info!(
            agent = self.config.agent_id,
            phase = ?mode,
            start = %self.current,
            episodes = self.config.episodes,
            "run started"
        );

        let outcome = match (mode, messenger.as_deref_mut()) {
            (EnginePhase::MultiLearn, Some(messenger)) => self.drive_multi(messenger),
            (EnginePhase::SingleExploit, _) => self.drive_single(Self::exploit_step),
            _ => self.drive_single(Self::learn_step),
        };
        self.phase = EnginePhase::Terminal;
        if let Err(e) = &outcome {
            error!(agent = self.config.agent_id, error = %e, "run aborted");
        }

        self.notify(|observer, _| observer.on_run_end());
        let persisted = if mode == EnginePhase::SingleExploit {
            Ok(())
        } else {
            self.persist()
        };
        if let Some(messenger) = messenger {
            let responder = Responder::new(self.config.agent_id, &self.q_store);
            if let Err(e) = messenger.shutdown(&responder) {
                warn!(agent = self.config.agent_id, error = %e, "messenger shutdown failed");
            }
        }

        outcome?;
        persisted?;
        let summary = RunSummary {
            agent_id: self.config.agent_id,
            phase: mode,
            episodes: self.completed_episodes,
            steps: self.total_steps,
            skipped_rounds: self.skipped_rounds,
            cancelled: self.cancel.is_cancelled(),
        };
        info!(
            agent = summary.agent_id,
            episodes = summary.episodes,
            steps = summary.steps,
            skipped_rounds = summary.skipped_rounds,
            "run finished"
        );
        Ok(summary)
    }

    fn drive_single(&mut self, step: fn(&mut Self) -> Result<StepOutcome>) -> Result<()> {
        while self.should_continue() {
            step(self)?;
        }
        Ok(())
    }

    fn drive_multi(&mut self, messenger: &mut dyn Messenger) -> Result<()> {
        while self.should_continue() {
            if let RoundOutcome::Skipped(reason) = self.multi_round(messenger)? {
                self.skipped_rounds += 1;
                debug!(agent = self.config.agent_id, ?reason, "round skipped");
            }
        }
        Ok(())
    }

    fn notify(&mut self, event: impl Fn(&mut dyn Observer, u64) -> Result<()>) {
        let episodes = self.config.episodes;
        for observer in &mut self.observers {
            if let Err(e) = event(observer.as_mut(), episodes) {
                warn!(agent = self.config.agent_id, error = %e, "observer failed");
            }
        }
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.config.policy_output else {
            return Ok(());
        };
        self.q_store.save(path)?;
        info!(
            agent = self.config.agent_id,
            path = %path.display(),
            entries = self.q_store.len(),
            "saved policy"
        );
        Ok(())
    }

    /// Apply `action` from the current state; update its entry when a
    /// confidence step is given.
    fn act(
        &mut self,
        mdp: &Mdp,
        action: &Action,
        confidence_step: Option<f64>,
    ) -> Result<StepOutcome> {
        let from = self.current;
        let transition = action.outcome();
        let reward = transition.reward();

        self.visits.record(from);
        self.current = transition.to();
        self.episode_steps += 1;
        self.total_steps += 1;

        if let Some(step) = confidence_step {
            let max_q = self.q_store.max_q(mdp, self.current);
            let prior = self
                .q_store
                .get(from, action.id())
                .ok_or(Error::MissingQEntry {
                    state: from,
                    action: action.id(),
                })?
                .value;
            let value = q_learning_target(prior, reward, max_q, self.params);
            self.q_store.update(from, action.id(), value, step)?;
            trace!(
                agent = self.config.agent_id,
                state = %from,
                action = %action.id(),
                reward,
                max_q,
                value,
                "q-value updated"
            );
        }

        if is_goal(reward) {
            return Ok(self.complete_episode());
        }
        Ok(StepOutcome::Continued)
    }

    fn complete_episode(&mut self) -> StepOutcome {
        self.completed_episodes += 1;
        let episode = self.completed_episodes;
        let steps = self.episode_steps;
        self.episode_steps = 0;
        debug!(agent = self.config.agent_id, episode, steps, "episode completed");
        for observer in &mut self.observers {
            if let Err(e) = observer.on_episode_end(episode, steps) {
                warn!(agent = self.config.agent_id, error = %e, "observer failed");
            }
        }
        self.current = self.start_state();
        StepOutcome::EpisodeCompleted { episode, steps }
    }

    fn leave_dead_end(&mut self) -> StepOutcome {
        warn!(
            agent = self.config.agent_id,
            state = %self.current,
            "state has no actions, restarting"
        );
        self.episode_steps = 0;
        self.current = self.start_state();
        StepOutcome::DeadEnd
    }

    /// One single-agent learning step: softmax over the local Q-values,
    /// apply the action, update its entry.
    pub fn learn_step(&mut self) -> Result<StepOutcome> {
        let mdp = Arc::clone(&self.mdp);
        let state = self.current_state_ref(&mdp)?;
        if state.is_dead_end() {
            return Ok(self.leave_dead_end());
        }
        let actions: Vec<&Action> = mdp.actions_of(state).collect();
        let values: Vec<f64> = actions
            .iter()
            .map(|action| self.q_store.lookup(&mdp, state.id(), action.id()))
            .collect();
        let index = self.policy.select(&values, &mut self.rng)?;
        self.act(&mdp, actions[index], Some(SINGLE_AGENT_CONFIDENCE_STEP))
    }

    /// One greedy step that leaves the Q-store untouched.
    pub fn exploit_step(&mut self) -> Result<StepOutcome> {
        let mdp = Arc::clone(&self.mdp);
        let state = self.current_state_ref(&mdp)?;
        let Some(action_id) = self.q_store.greedy_action(&mdp, state.id()) else {
            return Ok(self.leave_dead_end());
        };
        let action = mdp
            .action(action_id)
            .ok_or(Error::UnknownAction { action: action_id })?;
        self.act(&mdp, action, None)
    }

    /// One consensus round: ask the peers about the current state, merge
    /// their opinions with ours, act on the consensus and learn from the
    /// outcome.
    ///
    /// Transport failures, timeouts and mismatched responses skip the round
    /// without touching the Q-store.
    pub fn multi_round(&mut self, messenger: &mut dyn Messenger) -> Result<RoundOutcome> {
        let mdp = Arc::clone(&self.mdp);
        let state = self.current_state_ref(&mdp)?;
        if state.is_dead_end() {
            return Ok(RoundOutcome::Acted(self.leave_dead_end()));
        }
        let agent_id = self.config.agent_id;

        self.request_sequence = self.request_sequence.wrapping_add(1);
        let request = OpinionRequest {
            agent_id,
            request_number: self.request_sequence,
            state: state.id(),
            confidence: self.visits.count(state.id()) as f64,
        };

        messenger.register(request.request_number);
        if let Err(e) = messenger.send(&request) {
            warn!(agent = agent_id, error = %e, "failed to send opinion request");
            return Ok(RoundOutcome::Skipped(SkipReason::SendFailed));
        }

        let responder = Responder::new(agent_id, &self.q_store);
        let response = match messenger.await_response(
            request.request_number,
            self.config.response_timeout,
            &responder,
        ) {
            Ok(response) => response,
            Err(e) => {
                warn!(agent = agent_id, error = %e, "no opinion response");
                return Ok(RoundOutcome::Skipped(SkipReason::NoResponse));
            }
        };
        if response.request_number != request.request_number {
            warn!(
                agent = agent_id,
                sent = request.request_number,
                received = response.request_number,
                "response does not match the outstanding request"
            );
            return Ok(RoundOutcome::Skipped(SkipReason::RequestMismatch));
        }

        let actions: Vec<&Action> = mdp.actions_of(state).collect();
        let peers: Vec<OpinionRecord> = response
            .opinions
            .into_iter()
            .filter(|record| {
                let applies = record.state == state.id()
                    && actions.iter().any(|action| action.id() == record.action);
                if !applies {
                    debug!(
                        agent = agent_id,
                        asked = %state.id(),
                        state = %record.state,
                        action = %record.action,
                        "discarding opinion outside the current state"
                    );
                }
                applies
            })
            .collect();
        let local: Vec<OpinionRecord> = actions
            .iter()
            .map(|action| {
                OpinionRecord::new(
                    state.id(),
                    action.id(),
                    self.q_store.lookup(&mdp, state.id(), action.id()),
                    self.q_store.confidence(&mdp, state.id(), action.id()),
                )
            })
            .collect();

        let merged = consensus::aggregate(&peers, &local);
        let values: Vec<f64> = merged.iter().map(|opinion| opinion.q_value).collect();
        let index = self.policy.select(&values, &mut self.rng)?;
        let chosen = merged[index].action;
        let Some(action) = actions.iter().copied().find(|action| action.id() == chosen) else {
            warn!(
                agent = agent_id,
                state = %state.id(),
                action = %chosen,
                "consensus picked an action unavailable here"
            );
            return Ok(RoundOutcome::Skipped(SkipReason::UnknownAction));
        };

        for opinion in &merged {
            self.q_store.set_action_value(opinion.action, opinion.q_value);
        }
        trace!(
            agent = agent_id,
            state = %state.id(),
            action = %chosen,
            peers = peers.len(),
            "acting on consensus"
        );
        self.act(&mdp, action, Some(MULTI_AGENT_CONFIDENCE_STEP))
            .map(RoundOutcome::Acted)
    }

    /// Answer a peer's request from the current Q-store.
    pub fn answer(&self, request: &OpinionRequest) -> OpinionResponse {
        Responder::new(self.config.agent_id, &self.q_store).on_request(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{identifiers::ActionId, mdp::MdpBuilder};

    fn two_step() -> Arc<Mdp> {
        Arc::new(
            MdpBuilder::new()
                .state(0)
                .state(1)
                .state(2)
                .action(0, 0)
                .action(1, 1)
                .transition(0, 1, 0.5)
                .transition(1, 2, 1.0)
                .build()
                .unwrap(),
        )
    }

    fn config() -> AgentConfig {
        AgentConfig::new(1)
            .with_learning_rate(0.5)
            .with_discount_factor(0.9)
            .with_temperature(1.0)
            .with_start(0)
            .with_seed(5)
    }

    #[test]
    fn test_phase_selection() {
        assert_eq!(
            EnginePhase::select(OperationMode::Single, LearningMode::Exploit).unwrap(),
            EnginePhase::SingleExploit
        );
        assert!(EnginePhase::select(OperationMode::Multi, LearningMode::Exploit).is_err());
    }

    #[test]
    fn test_new_initializes_store_and_start() {
        let agent = Agent::new(two_step(), config()).unwrap();
        assert_eq!(agent.q_store().len(), 2);
        assert_eq!(agent.current_state(), StateId::new(0));
        assert_eq!(agent.phase(), EnginePhase::Initializing);
    }

    #[test]
    fn test_learn_steps_follow_update_rule() {
        let mut agent = Agent::new(two_step(), config()).unwrap();
        assert_eq!(agent.learn_step().unwrap(), StepOutcome::Continued);
        let entry = agent
            .q_store()
            .get(StateId::new(0), ActionId::new(0))
            .unwrap();
        assert_eq!(entry.value, 0.25);
        assert_eq!(entry.confidence, SINGLE_AGENT_CONFIDENCE_STEP);

        assert_eq!(
            agent.learn_step().unwrap(),
            StepOutcome::EpisodeCompleted {
                episode: 1,
                steps: 2
            }
        );
        assert_eq!(agent.current_state(), StateId::new(0));
    }

    #[test]
    fn test_start_out_of_range_rejected() {
        let result = Agent::new(two_step(), config().with_start(9));
        assert!(matches!(result, Err(Error::StartStateOutOfRange { .. })));
    }

    #[test]
    fn test_dead_end_start_rejected() {
        assert!(Agent::new(two_step(), config().with_start(2)).is_err());
    }

    #[test]
    fn test_answer_lists_entries_of_requested_state() {
        let agent = Agent::new(two_step(), config()).unwrap();
        let response = agent.answer(&OpinionRequest {
            agent_id: 7,
            request_number: 3,
            state: StateId::new(1),
            confidence: 0.0,
        });
        assert_eq!(response.agent_id, 1);
        assert_eq!(response.requester_id, 7);
        assert_eq!(response.request_number, 3);
        assert_eq!(response.opinions.len(), 1);
        assert_eq!(response.opinions[0].action, ActionId::new(1));
    }

    #[test]
    fn test_multi_without_messenger_rejected() {
        let mut agent = Agent::new(
            two_step(),
            config().with_operation_mode(OperationMode::Multi),
        )
        .unwrap();
        assert!(agent.run(None).is_err());
    }

    #[test]
    fn test_cancelled_run_stops_before_first_step() {
        let token = CancellationToken::new();
        token.cancel();
        let mut agent = Agent::new(two_step(), config().with_episodes(10))
            .unwrap()
            .with_cancellation(token);
        let summary = agent.run(None).unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.steps, 0);
        assert_eq!(agent.phase(), EnginePhase::Terminal);
    }

    #[test]
    fn test_missing_entry_aborts_run_but_saves_table() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("policy.txt");
        let mut agent = Agent::new(two_step(), config().with_policy_output(&path)).unwrap();
        agent.q_store = QStore::from_entries(
            agent
                .q_store
                .entries()
                .iter()
                .copied()
                .filter(|entry| entry.action != ActionId::new(1)),
        );

        let err = agent.execute(EnginePhase::SingleLearn, None).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingQEntry {
                action,
                ..
            } if action == ActionId::new(1)
        ));
        assert_eq!(agent.phase(), EnginePhase::Terminal);

        let saved = QStore::load(&path);
        assert_eq!(saved.len(), 1);
        assert_eq!(
            saved.get(StateId::new(0), ActionId::new(0)).unwrap().value,
            0.25
        );
    }

    #[test]
    fn test_request_numbers_wrap_instead_of_overflowing() {
        struct Silent;
        impl Messenger for Silent {
            fn register(&mut self, _request_number: u32) {}
            fn send(&mut self, _request: &OpinionRequest) -> Result<()> {
                Ok(())
            }
            fn await_response(
                &mut self,
                request_number: u32,
                _timeout: std::time::Duration,
                _handler: &dyn RequestHandler,
            ) -> Result<OpinionResponse> {
                Err(Error::ResponseTimeout {
                    request_number,
                    received: 0,
                    expected: 1,
                })
            }
        }

        let mut agent = Agent::new(
            two_step(),
            config().with_operation_mode(OperationMode::Multi),
        )
        .unwrap();
        agent.request_sequence = u32::MAX;
        let outcome = agent.multi_round(&mut Silent).unwrap();
        assert_eq!(outcome, RoundOutcome::Skipped(SkipReason::NoResponse));
        assert_eq!(agent.request_sequence, 0);
    }

    #[test]
    fn test_step_limit_ends_run() {
        let mut agent = Agent::new(two_step(), config().with_episodes(100).with_max_steps(3))
            .unwrap();
        let summary = agent.run(None).unwrap();
        assert_eq!(summary.steps, 3);
        assert_eq!(summary.episodes, 1);
    }
}
