//! Inspect command - print a saved Q-table

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    cli::output::{print_kv, print_section, print_subsection},
    mdp::Mdp,
    q_learning::QStore,
};

#[derive(Parser, Debug)]
#[command(about = "Print a saved Q-table")]
pub struct InspectArgs {
    /// Q-table file written by `marl run`
    #[arg(long, short = 'i')]
    pub policy: PathBuf,

    /// Problem description; adds the greedy action for every state
    #[arg(long, short = 'p')]
    pub problem: Option<PathBuf>,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    if !args.policy.is_file() {
        bail!("policy file {} does not exist", args.policy.display());
    }
    let store = QStore::load(&args.policy);

    print_section("Q-Table");
    print_kv("File", &args.policy.display().to_string());
    print_kv("Entries", &store.len().to_string());
    println!();
    println!("  {:>8} {:>8} {:>20} {:>12}", "state", "action", "value", "confidence");
    for entry in store.entries() {
        println!(
            "  {:>8} {:>8} {:>20.15} {:>12.4}",
            entry.state, entry.action, entry.value, entry.confidence
        );
    }

    if let Some(problem) = &args.problem {
        let mdp = Mdp::load(problem)
            .with_context(|| format!("failed to load problem {}", problem.display()))?;
        print_subsection("Greedy policy");
        for state in mdp.states() {
            let choice = match store.greedy_action(&mdp, state.id()) {
                Some(action) => format!("{action} (Q = {:.6})", store.lookup(&mdp, state.id(), action)),
                None => "-".to_string(),
            };
            print_kv(&format!("state {}", state.id()), &choice);
        }
    }

    Ok(())
}
