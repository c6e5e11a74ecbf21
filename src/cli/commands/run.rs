//! Run command - learn or follow a policy for a problem

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use serde_json::to_writer_pretty;

use crate::{
    adapters::LocalHub,
    app::{AgentConfig, LearningMode, OperationMode},
    cli::output::{format_number, print_kv, print_section, print_subsection},
    engine::{Agent, CancellationToken, ProgressObserver, RunSummary},
    identifiers::AgentId,
    mdp::Mdp,
    ports::Messenger,
};

#[derive(Parser, Debug)]
#[command(about = "Learn or follow a policy for a problem")]
pub struct RunArgs {
    /// Problem description (JSON)
    #[arg(long, short = 'p')]
    pub problem: PathBuf,

    /// Agent id; in multi mode the first of `--agents` consecutive ids
    #[arg(long, default_value_t = 0)]
    pub agent_id: AgentId,

    /// Start state index into the problem's state list (random when omitted)
    #[arg(long, short = 's')]
    pub start: Option<usize>,

    /// Operation mode (single or multi)
    #[arg(long, short = 'm', default_value_t = OperationMode::Single)]
    pub operation_mode: OperationMode,

    /// Learning mode (learn or exploit)
    #[arg(long, short = 'l', default_value_t = LearningMode::Learn)]
    pub learning_mode: LearningMode,

    /// Number of episodes to run
    #[arg(long, short = 'e', default_value_t = 1)]
    pub episodes: u64,

    /// Learning rate α (0.0-1.0)
    #[arg(long, default_value_t = AgentConfig::DEFAULT_LEARNING_RATE)]
    pub learning_rate: f64,

    /// Discount factor γ (0.0-1.0)
    #[arg(long, default_value_t = AgentConfig::DEFAULT_DISCOUNT_FACTOR)]
    pub discount_factor: f64,

    /// Softmax temperature τ; larger values explore more
    #[arg(long, default_value_t = AgentConfig::DEFAULT_TEMPERATURE)]
    pub temperature: f64,

    /// Where the learned Q-table is written (required in learn mode)
    #[arg(long, short = 'o')]
    pub policy_output: Option<PathBuf>,

    /// Q-table to follow in exploit mode, or to warm-start from
    #[arg(long, short = 'i')]
    pub policy_input: Option<PathBuf>,

    /// Episode statistics file
    #[arg(long)]
    pub stats_file: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many actions in total
    #[arg(long)]
    pub max_steps: Option<u64>,

    /// How long a round waits for peer opinions, in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub response_timeout_ms: u64,

    /// Cooperating agents to run in this process (multi mode)
    #[arg(long, default_value_t = 2)]
    pub agents: u32,

    /// Optional path for writing run summaries as JSON
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

/// `policy.txt` for agent 3 becomes `policy.3.txt`.
fn per_agent_path(path: &Path, agent_id: AgentId) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.{agent_id}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{agent_id}"),
    };
    path.with_file_name(name)
}

fn agent_config(args: &RunArgs, agent_id: AgentId, shared_files: bool) -> AgentConfig {
    let output_path = |path: &PathBuf| {
        if shared_files {
            path.clone()
        } else {
            per_agent_path(path, agent_id)
        }
    };

    let mut config = AgentConfig::new(agent_id)
        .with_operation_mode(args.operation_mode)
        .with_learning_mode(args.learning_mode)
        .with_learning_rate(args.learning_rate)
        .with_discount_factor(args.discount_factor)
        .with_temperature(args.temperature)
        .with_episodes(args.episodes)
        .with_response_timeout(Duration::from_millis(args.response_timeout_ms));
    config.start = args.start;
    config.policy_input = args.policy_input.clone();
    config.policy_output = args.policy_output.as_ref().map(output_path);
    config.stats_path = args.stats_file.as_ref().map(output_path);
    config.seed = args
        .seed
        .map(|seed| seed.wrapping_add(u64::from(agent_id - args.agent_id)));
    config.max_steps = args.max_steps;
    config
}

fn build_agent(mdp: &Arc<Mdp>, config: AgentConfig, progress: bool) -> Result<Agent> {
    let agent_id = config.agent_id;
    let mut agent = Agent::new(Arc::clone(mdp), config)
        .with_context(|| format!("failed to create agent {agent_id}"))?;
    if progress {
        agent = agent.with_observer(Box::new(ProgressObserver::new(format!("agent {agent_id}"))));
    }
    Ok(agent)
}

fn run_single(args: &RunArgs, mdp: &Arc<Mdp>) -> Result<RunSummary> {
    let mut agent = build_agent(mdp, agent_config(args, args.agent_id, true), args.progress)?;
    agent
        .run(None)
        .with_context(|| format!("agent {} failed", args.agent_id))
}

fn run_cooperative(args: &RunArgs, mdp: &Arc<Mdp>) -> Result<Vec<RunSummary>> {
    if args.agents == 0 {
        bail!("--agents must be at least 1");
    }
    let last_id = args
        .agent_id
        .checked_add(args.agents - 1)
        .ok_or_else(|| anyhow!("agent ids overflow starting from {}", args.agent_id))?;

    let hub = LocalHub::new();
    let token = CancellationToken::new();
    let mut members = Vec::new();
    for agent_id in args.agent_id..=last_id {
        let endpoint = hub
            .join(agent_id)
            .with_context(|| format!("agent {agent_id} could not join the hub"))?;
        let shared_files = args.agents == 1;
        let agent = build_agent(
            mdp,
            agent_config(args, agent_id, shared_files),
            args.progress && agent_id == args.agent_id,
        )?
        .with_cancellation(token.clone());
        members.push((agent, endpoint));
    }

    let results: Vec<Result<RunSummary>> = thread::scope(|scope| {
        let handles: Vec<_> = members
            .into_iter()
            .map(|(mut agent, mut endpoint)| {
                let token = token.clone();
                scope.spawn(move || {
                    let agent_id = agent.id();
                    let messenger: &mut dyn Messenger = &mut endpoint;
                    let result = agent.run(Some(messenger));
                    if result.is_err() {
                        token.cancel();
                    }
                    result.with_context(|| format!("agent {agent_id} failed"))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("agent thread panicked")))
            })
            .collect()
    });

    results.into_iter().collect()
}

pub fn execute(args: RunArgs) -> Result<()> {
    if args.learning_mode == LearningMode::Learn && args.policy_output.is_none() {
        bail!("learn mode requires --policy-output");
    }
    let mdp = Arc::new(
        Mdp::load(&args.problem)
            .with_context(|| format!("failed to load problem {}", args.problem.display()))?,
    );

    print_section("Run Configuration");
    print_kv("Problem", &args.problem.display().to_string());
    print_kv(
        "States / actions",
        &format!("{} / {}", mdp.state_count(), mdp.action_count()),
    );
    print_kv(
        "Mode",
        &format!("{} / {}", args.operation_mode, args.learning_mode),
    );
    print_kv("Episodes", &format_number(args.episodes));
    print_kv(
        "α / γ / τ",
        &format!(
            "{} / {} / {}",
            args.learning_rate, args.discount_factor, args.temperature
        ),
    );
    if let Some(seed) = args.seed {
        print_kv("Seed", &seed.to_string());
    }
    if args.operation_mode == OperationMode::Multi {
        print_kv("Agents", &args.agents.to_string());
    }

    let summaries = match args.operation_mode {
        OperationMode::Single => vec![run_single(&args, &mdp)?],
        OperationMode::Multi => run_cooperative(&args, &mdp)?,
    };

    print_section("Results");
    for summary in &summaries {
        print_subsection(&format!("Agent {}", summary.agent_id));
        print_kv("Episodes", &format_number(summary.episodes));
        print_kv("Steps", &format_number(summary.steps));
        if summary.episodes > 0 {
            print_kv(
                "Mean steps",
                &format!("{:.2}", summary.steps as f64 / summary.episodes as f64),
            );
        }
        if args.operation_mode == OperationMode::Multi {
            print_kv("Skipped rounds", &format_number(summary.skipped_rounds));
        }
        if summary.cancelled {
            print_kv("Stopped", "cancelled");
        }
    }

    if let Some(path) = &args.summary {
        let file = File::create(path)
            .with_context(|| format!("failed to create summary {}", path.display()))?;
        to_writer_pretty(file, &summaries)
            .with_context(|| format!("failed to write summary {}", path.display()))?;
        println!("\nSummary written to: {}", path.display());
    }

    Ok(())
}
