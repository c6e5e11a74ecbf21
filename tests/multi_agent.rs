//! Consensus rounds against stub and in-process messengers

mod common;

use std::{thread, time::Duration};

use marl::{
    AgentConfig, Error, OperationMode, Result, StateId,
    adapters::LocalHub,
    engine::{Agent, CancellationToken, RoundOutcome, SkipReason, StepOutcome},
    identifiers::ActionId,
    ports::{Messenger, RequestHandler},
    protocol::{OpinionRecord, OpinionRequest, OpinionResponse},
};

/// Messenger that answers every request with a canned response.
struct ScriptedMessenger {
    sent: Vec<OpinionRequest>,
    registered: Vec<u32>,
    request_number_offset: u32,
    opinions: Vec<OpinionRecord>,
    fail_send: bool,
}

impl ScriptedMessenger {
    fn echoing(opinions: Vec<OpinionRecord>) -> Self {
        Self {
            sent: Vec::new(),
            registered: Vec::new(),
            request_number_offset: 0,
            opinions,
            fail_send: false,
        }
    }

    fn mismatching() -> Self {
        Self {
            request_number_offset: 1,
            ..Self::echoing(Vec::new())
        }
    }
}

impl Messenger for ScriptedMessenger {
    fn register(&mut self, request_number: u32) {
        self.registered.push(request_number);
    }

    fn send(&mut self, request: &OpinionRequest) -> Result<()> {
        if self.fail_send {
            return Err(Error::Transport {
                message: "link down".to_string(),
            });
        }
        self.sent.push(*request);
        Ok(())
    }

    fn await_response(
        &mut self,
        request_number: u32,
        _timeout: Duration,
        _handler: &dyn RequestHandler,
    ) -> Result<OpinionResponse> {
        let request = self.sent.last().copied().ok_or(Error::ResponseTimeout {
            request_number,
            received: 0,
            expected: 1,
        })?;
        let mut response = OpinionResponse::answering(&request, 99);
        response.request_number += self.request_number_offset;
        response.opinions = self.opinions.clone();
        Ok(response)
    }
}

fn multi_config() -> AgentConfig {
    AgentConfig::new(1)
        .with_operation_mode(OperationMode::Multi)
        .with_learning_rate(0.5)
        .with_discount_factor(0.9)
        .with_temperature(1.0)
        .with_start(0)
        .with_seed(8)
}

#[test]
fn mismatched_response_skips_round() {
    let mut agent = Agent::new(common::two_step_chain(), multi_config()).unwrap();
    let before = agent.q_store().clone();
    let mut messenger = ScriptedMessenger::mismatching();

    let outcome = agent.multi_round(&mut messenger).unwrap();
    assert_eq!(outcome, RoundOutcome::Skipped(SkipReason::RequestMismatch));
    assert_eq!(agent.q_store(), &before, "no q-store mutation");
    assert_eq!(agent.current_state(), StateId::new(0), "no progress");
    assert_eq!(messenger.registered, vec![1]);

    // the next round uses a fresh request number
    agent.multi_round(&mut messenger).unwrap();
    assert_eq!(messenger.registered, vec![1, 2]);
    assert_eq!(messenger.sent[1].request_number, 2);
}

#[test]
fn send_failure_skips_round() {
    let mut agent = Agent::new(common::two_step_chain(), multi_config()).unwrap();
    let before = agent.q_store().clone();
    let mut messenger = ScriptedMessenger::echoing(Vec::new());
    messenger.fail_send = true;

    let outcome = agent.multi_round(&mut messenger).unwrap();
    assert_eq!(outcome, RoundOutcome::Skipped(SkipReason::SendFailed));
    assert_eq!(agent.q_store(), &before);
}

#[test]
fn request_carries_visit_count() {
    let mut agent = Agent::new(common::two_step_chain(), multi_config()).unwrap();
    let mut messenger = ScriptedMessenger::echoing(Vec::new());

    agent.multi_round(&mut messenger).unwrap();
    agent.multi_round(&mut messenger).unwrap();
    agent.multi_round(&mut messenger).unwrap();

    let first = messenger.sent[0];
    assert_eq!(first.agent_id, 1);
    assert_eq!(first.state, StateId::new(0));
    assert_eq!(first.confidence, 0.0);
    // back at the start after one episode, visited once before
    assert_eq!(messenger.sent[2].state, StateId::new(0));
    assert_eq!(messenger.sent[2].confidence, 1.0);
}

#[test]
fn consensus_round_applies_peer_opinion() {
    let mut agent = Agent::new(common::two_step_chain(), multi_config()).unwrap();
    let peer = OpinionRecord::new(StateId::new(0), ActionId::new(0), 0.4, 1.0);
    let stray = OpinionRecord::new(StateId::new(1), ActionId::new(1), 9.0, 5.0);
    let mut messenger = ScriptedMessenger::echoing(vec![peer, stray]);

    let outcome = agent.multi_round(&mut messenger).unwrap();
    assert_eq!(outcome, RoundOutcome::Acted(StepOutcome::Continued));

    // consensus value 0.4 (local confidence 0), then the update rule:
    // 0.5 * 0.4 + 0.5 * (0.5 + 0.9 * 0) = 0.45
    let entry = agent
        .q_store()
        .get(StateId::new(0), ActionId::new(0))
        .unwrap();
    assert!((entry.value - 0.45).abs() < 1e-12);
    assert!((entry.confidence - 0.1).abs() < 1e-12);

    // the record about another state was ignored
    let other = agent
        .q_store()
        .get(StateId::new(1), ActionId::new(1))
        .unwrap();
    assert_eq!(other.value, 0.0);
}

#[test]
fn peer_opinion_about_foreign_action_is_ignored() {
    // action 1 leaves state 1, yet the peer files it under state 0
    let foreign = OpinionRecord::new(StateId::new(0), ActionId::new(1), 7.0, 1.0);
    for seed in 0..20 {
        let mut agent = Agent::new(common::two_step_chain(), multi_config().with_seed(seed))
            .expect("Failed to create agent");
        let mut messenger = ScriptedMessenger::echoing(vec![foreign]);

        let outcome = agent.multi_round(&mut messenger).expect("Round failed");
        assert_eq!(outcome, RoundOutcome::Acted(StepOutcome::Continued));
        assert_eq!(agent.current_state(), StateId::new(1));

        let other = agent
            .q_store()
            .get(StateId::new(1), ActionId::new(1))
            .unwrap();
        assert_eq!(other.value, 0.0, "entry of another state left alone");
        assert_eq!(other.confidence, 0.0);
        let acted = agent
            .q_store()
            .get(StateId::new(0), ActionId::new(0))
            .unwrap();
        assert_eq!(acted.value, 0.25);
    }
}

#[test]
fn agents_learn_together_on_hub() {
    let hub = LocalHub::new();
    let token = CancellationToken::new();
    let mdp = common::fork();

    let mut members = Vec::new();
    for agent_id in 1..=2 {
        let endpoint = hub.join(agent_id).unwrap();
        let config = AgentConfig::new(agent_id)
            .with_operation_mode(OperationMode::Multi)
            .with_learning_rate(0.5)
            .with_temperature(0.5)
            .with_episodes(20)
            .with_start(0)
            .with_seed(u64::from(agent_id))
            .with_response_timeout(Duration::from_secs(2));
        let agent = Agent::new(mdp.clone(), config)
            .unwrap()
            .with_cancellation(token.clone());
        members.push((agent, endpoint));
    }

    let summaries: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = members
            .into_iter()
            .map(|(mut agent, mut endpoint)| {
                scope.spawn(move || {
                    let messenger: &mut dyn Messenger = &mut endpoint;
                    let summary = agent.run(Some(messenger)).expect("run failed");
                    (summary, agent.q_store().clone())
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("agent thread panicked"))
            .collect()
    });

    for (summary, store) in &summaries {
        assert_eq!(summary.episodes, 20);
        assert!(summary.steps >= 20);
        assert!(
            store.entries().iter().any(|entry| entry.value > 0.0),
            "goal reward propagated"
        );
    }
    assert_eq!(hub.members(), 0, "agents leave the hub on shutdown");
}
