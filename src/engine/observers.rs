//! Observers for learning runs
//!
//! Observers collect episode statistics without coupling the engine to an
//! output format.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{Error, Result, ports::Observer};

pub const STATS_HEADER: &str = "# episode steps";

/// Episodes between forced flushes of the statistics file.
pub const STATS_FLUSH_INTERVAL: u64 = 100;

/// Statistics file observer - one `episode steps` line per episode
pub struct StatsFileObserver {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    since_flush: u64,
}

impl StatsFileObserver {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
            since_flush: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&mut self) -> Result<()> {
        self.since_flush = 0;
        match self.writer.as_mut() {
            Some(writer) => writer.flush().map_err(|e| {
                Error::io(format!("flush statistics {}", self.path.display()), e)
            }),
            None => Ok(()),
        }
    }
}

impl Observer for StatsFileObserver {
    fn on_run_start(&mut self, _total_episodes: u64) -> Result<()> {
        let file = File::create(&self.path)
            .map_err(|e| Error::io(format!("create statistics {}", self.path.display()), e))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{STATS_HEADER}")
            .map_err(|e| Error::io(format!("write statistics {}", self.path.display()), e))?;
        self.writer = Some(writer);
        self.since_flush = 0;
        Ok(())
    }

    fn on_episode_end(&mut self, episode: u64, steps: u64) -> Result<()> {
        let Some(writer) = self.writer.as_mut() else {
            return Ok(());
        };
        writeln!(writer, "{episode} {steps}")
            .map_err(|e| Error::io(format!("write statistics {}", self.path.display()), e))?;
        self.since_flush += 1;
        if self.since_flush >= STATS_FLUSH_INTERVAL {
            self.flush()?;
        }
        Ok(())
    }

    fn on_run_end(&mut self) -> Result<()> {
        self.flush()?;
        self.writer = None;
        Ok(())
    }
}

/// In-memory recorder of `(episode, steps)` pairs.
///
/// Clones share the same record, so a clone can be handed to the engine
/// and the first handle inspected afterwards.
#[derive(Debug, Clone, Default)]
pub struct EpisodeRecorder {
    records: Arc<Mutex<Vec<(u64, u64)>>>,
}

impl EpisodeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(u64, u64)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Average episode length, 0 when nothing was recorded.
    pub fn mean_steps(&self) -> f64 {
        let records = self.records();
        if records.is_empty() {
            0.0
        } else {
            records.iter().map(|&(_, steps)| steps).sum::<u64>() as f64 / records.len() as f64
        }
    }
}

impl Observer for EpisodeRecorder {
    fn on_run_start(&mut self, _total_episodes: u64) -> Result<()> {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
        Ok(())
    }

    fn on_episode_end(&mut self, episode: u64, steps: u64) -> Result<()> {
        if let Ok(mut records) = self.records.lock() {
            records.push((episode, steps));
        }
        Ok(())
    }
}

/// Progress bar observer - Shows episode progress
pub struct ProgressObserver {
    label: String,
    progress_bar: Option<ProgressBar>,
}

impl ProgressObserver {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            progress_bar: None,
        }
    }
}

impl Observer for ProgressObserver {
    fn on_run_start(&mut self, total_episodes: u64) -> Result<()> {
        let pb = ProgressBar::new(total_episodes);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        pb.set_prefix(self.label.clone());
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, episode: u64, steps: u64) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.set_position(episode);
            pb.set_message(format!("last: {steps} steps"));
        }
        Ok(())
    }

    fn on_run_end(&mut self) -> Result<()> {
        if let Some(pb) = self.progress_bar.take() {
            pb.finish();
        }
        Ok(())
    }
}
