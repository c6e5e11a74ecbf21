//! Following a saved table without learning

mod common;

use std::fs;

use marl::{
    AgentConfig, LearningMode, StateId,
    engine::{Agent, EnginePhase, EpisodeRecorder},
    identifiers::ActionId,
};
use tempfile::TempDir;

fn saved_policy(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("policy.txt");
    fs::write(
        &path,
        "# state action value confidence\n0 0 0.2 1.0\n0 1 0.9 1.0\n1 2 0.5 1.0\n",
    )
    .expect("write policy");
    path
}

#[test]
fn exploit_follows_greedy_action_without_updates() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = saved_policy(&temp_dir);
    let output = temp_dir.path().join("unused.txt");

    let recorder = EpisodeRecorder::new();
    let config = AgentConfig::new(1)
        .with_learning_mode(LearningMode::Exploit)
        .with_policy_input(&input)
        .with_policy_output(&output)
        .with_start(0)
        .with_episodes(5);
    let mut agent = Agent::new(common::fork(), config)
        .expect("Failed to create agent")
        .with_observer(Box::new(recorder.clone()));
    let before = agent.q_store().clone();

    let summary = agent.run(None).expect("Run failed");
    assert_eq!(summary.phase, EnginePhase::SingleExploit);
    assert_eq!(recorder.records(), vec![(1, 1), (2, 1), (3, 1), (4, 1), (5, 1)]);
    assert_eq!(agent.q_store(), &before, "exploit never mutates the table");
    assert!(!output.exists(), "exploit never saves the table");
    assert_eq!(
        agent
            .q_store()
            .get(StateId::new(0), ActionId::new(1))
            .unwrap()
            .value,
        0.9
    );
}

#[test]
fn exploit_ties_pick_first_action() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let input = temp_dir.path().join("flat.txt");
    fs::write(&input, "0 0 0.5 1.0\n0 1 0.5 1.0\n").expect("write policy");

    let recorder = EpisodeRecorder::new();
    let config = AgentConfig::new(1)
        .with_learning_mode(LearningMode::Exploit)
        .with_policy_input(&input)
        .with_start(0)
        .with_episodes(1);
    let mut agent = Agent::new(common::fork(), config)
        .unwrap()
        .with_observer(Box::new(recorder.clone()));
    agent.run(None).unwrap();
    // action 0 goes through state 1, so the episode takes two steps
    assert_eq!(recorder.records(), vec![(1, 2)]);
}

#[test]
fn exploit_with_missing_table_uses_zeros() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = AgentConfig::new(1)
        .with_learning_mode(LearningMode::Exploit)
        .with_policy_input(temp_dir.path().join("missing.txt"))
        .with_start(0)
        .with_max_steps(10)
        .with_episodes(3);
    let mut agent = Agent::new(common::fork(), config).unwrap();
    let summary = agent.run(None).unwrap();
    assert_eq!(summary.episodes, 3);
    assert!(agent.q_store().entries().iter().all(|e| e.value == 0.0));
}
