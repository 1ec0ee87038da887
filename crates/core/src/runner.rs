use crate::apply::apply_candidate;
use crate::metadata::NameSource;
use crate::planner::{Planned, Planner, SkipReason};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub succeeded: usize,
    pub skipped: usize,
    pub errored: usize,
    pub metadata_used: usize,
    pub fallback_used: usize,
}

impl RunCounters {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Renamed { source, .. } | Outcome::WouldRename { source, .. } => {
                self.succeeded += 1;
                match source {
                    NameSource::Metadata => self.metadata_used += 1,
                    NameSource::FallbackUnique => self.fallback_used += 1,
                }
            }
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Errored { .. } => self.errored += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Renamed { target: PathBuf, source: NameSource },
    WouldRename { target: PathBuf, source: NameSource },
    Skipped { reason: SkipReason },
    Errored { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub interrupted: bool,
    pub counters: RunCounters,
    pub elapsed: Duration,
    pub outcomes: Vec<FileOutcome>,
}

impl RunReport {
    pub fn has_errors(&self) -> bool {
        self.counters.errored > 0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counters;
        let succeeded_label = if self.dry_run {
            "would rename"
        } else {
            "renamed"
        };
        write!(
            f,
            "{succeeded_label}: {} (metadata {}, fallback {}), skipped: {}, errors: {}, elapsed: {:.2}s",
            c.succeeded,
            c.metadata_used,
            c.fallback_used,
            c.skipped,
            c.errored,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Carries every file through plan and rename, one file at a time. A file
/// that fails is counted and logged; the batch keeps going. `cancel` is
/// checked before each file and again before each rename.
pub fn run_batch(
    files: &[PathBuf],
    planner: &mut Planner,
    options: RunOptions,
    cancel: &AtomicBool,
) -> RunReport {
    let started = Instant::now();
    let mut counters = RunCounters::default();
    let mut outcomes = Vec::with_capacity(files.len());
    let mut interrupted = false;

    for path in files {
        if cancel.load(Ordering::SeqCst) {
            interrupted = true;
            break;
        }

        let outcome = match planner.plan_file(path) {
            Ok(Planned::Skip(reason)) => {
                info!("skip {} ({reason:?})", path.display());
                Outcome::Skipped { reason }
            }
            Ok(Planned::Rename(candidate)) => {
                if cancel.load(Ordering::SeqCst) {
                    interrupted = true;
                    break;
                }
                if options.dry_run {
                    info!(
                        "would rename {} -> {}",
                        candidate.original_path.display(),
                        candidate.target_path.display()
                    );
                    Outcome::WouldRename {
                        target: candidate.target_path,
                        source: candidate.source,
                    }
                } else {
                    match apply_candidate(&candidate) {
                        Ok(()) => {
                            info!(
                                "renamed {} -> {}",
                                candidate.original_path.display(),
                                candidate.target_path.display()
                            );
                            Outcome::Renamed {
                                target: candidate.target_path,
                                source: candidate.source,
                            }
                        }
                        Err(err) => {
                            error!("{}: {err}", path.display());
                            Outcome::Errored {
                                message: err.to_string(),
                            }
                        }
                    }
                }
            }
            Err(err) => {
                error!("{}: {err}", path.display());
                Outcome::Errored {
                    message: err.to_string(),
                }
            }
        };

        counters.record(&outcome);
        outcomes.push(FileOutcome {
            path: path.clone(),
            outcome,
        });
    }

    RunReport {
        dry_run: options.dry_run,
        interrupted,
        counters,
        elapsed: started.elapsed(),
        outcomes,
    }
}
