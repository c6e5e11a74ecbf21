//! Observer port - abstraction for run observation and statistics
//!
//! This port defines the interface for observing learning runs, allowing
//! statistics files, progress bars and in-memory recorders to be composed
//! without coupling the engine to any output format.
//!
//! # Event Sequence
//!
//! 1. `on_run_start(total_episodes)` - Once at the beginning
//! 2. `on_episode_end(episode, steps)` - Each time a goal is reached
//! 3. `on_run_end()` - Once, also after a run that stopped on an error
//!
//! # Examples
//!
//! ```no_run
//! use marl::ports::Observer;
//!
//! struct LongestEpisode {
//!     steps: u64,
//! }
//!
//! impl Observer for LongestEpisode {
//!     fn on_episode_end(&mut self, _episode: u64, steps: u64) -> marl::Result<()> {
//!         self.steps = self.steps.max(steps);
//!         Ok(())
//!     }
//! }
//! ```

use crate::Result;

pub trait Observer: Send {
    /// Called when a run starts.
    ///
    /// # Default Implementation
    ///
    /// Does nothing.
    fn on_run_start(&mut self, _total_episodes: u64) -> Result<()> {
        Ok(())
    }

    /// Called when an episode completes.
    ///
    /// # Parameters
    ///
    /// * `episode` - Number of completed episodes, starting at 1
    /// * `steps` - Actions taken during the episode
    fn on_episode_end(&mut self, _episode: u64, _steps: u64) -> Result<()> {
        Ok(())
    }

    /// Called when the run ends. Use this to flush outputs.
    fn on_run_end(&mut self) -> Result<()> {
        Ok(())
    }
}
