//! Scheduling-order demonstration.
//!
//! One invocation schedules a timer, queues a deferred task and starts a file
//! read while still in its synchronous section, then records the order in
//! which each callback actually runs. Synchronous lines always come first and
//! deferred tasks always drain before any timer fires.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::contract::{Handler, InvocationContext};
use crate::error::HandlerError;

pub const DEFAULT_TIMER_DELAY: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Synchronous,
    Deferred,
    Io,
    Timer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub phase: Phase,
    pub message: String,
}

/// Ordered, shareable record of the lines an invocation emitted.
#[derive(Debug, Clone, Default)]
pub struct PhaseJournal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl PhaseJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, phase: Phase, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(component = "scheduling", phase = ?phase, "{message}");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(JournalEntry { phase, message });
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn phases(&self) -> Vec<Phase> {
        self.entries().iter().map(|entry| entry.phase).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulingConfig {
    pub timer_delay: Duration,
    /// Keep the invocation open until the pending timer has fired.
    pub wait_for_pending_tasks: bool,
    /// File read during the synchronous section; `None` reads the running executable.
    pub read_path: Option<PathBuf>,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            timer_delay: DEFAULT_TIMER_DELAY,
            wait_for_pending_tasks: true,
            read_path: None,
        }
    }
}

type DeferredTask = Box<dyn FnOnce(&PhaseJournal) + Send>;

#[derive(Debug, Clone, Default)]
pub struct SchedulingDemo {
    config: SchedulingConfig,
}

impl SchedulingDemo {
    pub fn new(config: SchedulingConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self, journal: &PhaseJournal) -> Result<&'static str, HandlerError> {
        journal.record(Phase::Synchronous, "1. synchronous start");

        // The timer deadline starts counting at registration, but the callback
        // may not run before the synchronous section and its deferred tasks end.
        let deadline = Instant::now() + self.config.timer_delay;
        let (stack_cleared, stack_cleared_rx) = oneshot::channel::<()>();
        let timer_journal = journal.clone();
        let timer = tokio::spawn(async move {
            if stack_cleared_rx.await.is_err() {
                return;
            }
            tokio::time::sleep_until(deadline).await;
            timer_journal.record(Phase::Timer, "A. timer callback");
        });

        let mut deferred: VecDeque<DeferredTask> = VecDeque::new();
        deferred.push_back(Box::new(|journal| {
            journal.record(Phase::Deferred, "B. deferred task");
        }));

        let read_path = self.read_path()?;
        let read = tokio::spawn(tokio::fs::read(read_path.clone()));

        journal.record(Phase::Synchronous, "2. synchronous end");

        while let Some(task) = deferred.pop_front() {
            task(journal);
        }
        let _ = stack_cleared.send(());

        let path = read_path.display();
        let read_outcome = match read.await {
            Ok(Ok(bytes)) => format!("C. read {} bytes from {path}", bytes.len()),
            Ok(Err(error)) => format!("C. failed to read {path}: {error}"),
            Err(error) => format!("C. read task for {path} aborted: {error}"),
        };
        journal.record(Phase::Io, read_outcome);

        if self.config.wait_for_pending_tasks {
            if let Err(error) = timer.await {
                tracing::warn!(component = "scheduling", %error, "timer task did not complete");
            }
        } else {
            tracing::debug!(
                component = "scheduling",
                "returning with the timer still pending"
            );
        }

        Ok("OK")
    }

    fn read_path(&self) -> Result<PathBuf, HandlerError> {
        match &self.config.read_path {
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_exe()?),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchedulingHandler {
    demo: SchedulingDemo,
}

impl SchedulingHandler {
    pub fn new(demo: SchedulingDemo) -> Self {
        Self { demo }
    }
}

#[async_trait]
impl Handler for SchedulingHandler {
    fn name(&self) -> &'static str {
        "scheduling"
    }

    async fn invoke(
        &self,
        _event: Value,
        _context: &InvocationContext,
    ) -> Result<Value, HandlerError> {
        let journal = PhaseJournal::new();
        let outcome = self.demo.run(&journal).await?;
        Ok(Value::from(outcome))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn demo_for(file: &tempfile::NamedTempFile, timer_delay: Duration) -> SchedulingDemo {
        SchedulingDemo::new(SchedulingConfig {
            timer_delay,
            wait_for_pending_tasks: true,
            read_path: Some(file.path().to_path_buf()),
        })
    }

    fn io_message(journal: &PhaseJournal) -> String {
        journal
            .entries()
            .into_iter()
            .find(|entry| entry.phase == Phase::Io)
            .map(|entry| entry.message)
            .expect("journal should hold an io entry")
    }

    fn position(phases: &[Phase], phase: Phase) -> usize {
        phases
            .iter()
            .position(|value| *value == phase)
            .unwrap_or_else(|| panic!("missing {phase:?} entry in {phases:?}"))
    }

    #[tokio::test(start_paused = true)]
    async fn synchronous_lines_precede_every_scheduled_callback() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"hello").expect("write temp file");
        let journal = PhaseJournal::new();

        let outcome = demo_for(&file, DEFAULT_TIMER_DELAY)
            .run(&journal)
            .await
            .expect("demo should succeed");

        assert_eq!(outcome, "OK");
        let phases = journal.phases();
        assert_eq!(phases.len(), 5);
        assert_eq!(&phases[..2], &[Phase::Synchronous, Phase::Synchronous]);
        let deferred_at = position(&phases, Phase::Deferred);
        let timer_at = position(&phases, Phase::Timer);
        assert!(deferred_at < timer_at);
        assert!(io_message(&journal).contains("read 5 bytes"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn deferred_task_precedes_timer_even_without_delay() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        for _ in 0..20 {
            let journal = PhaseJournal::new();
            demo_for(&file, Duration::ZERO)
                .run(&journal)
                .await
                .expect("demo should succeed");

            let phases = journal.phases();
            let expected = [Phase::Synchronous, Phase::Synchronous, Phase::Deferred];
            assert_eq!(&phases[..3], &expected);
            assert!(phases.contains(&Phase::Timer));
        }
    }

    #[tokio::test]
    async fn detached_timer_is_not_awaited() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let demo = SchedulingDemo::new(SchedulingConfig {
            timer_delay: Duration::from_secs(60),
            wait_for_pending_tasks: false,
            read_path: Some(file.path().to_path_buf()),
        });
        let journal = PhaseJournal::new();

        demo.run(&journal).await.expect("demo should succeed");

        assert!(!journal.phases().contains(&Phase::Timer));
        assert_eq!(journal.phases().last(), Some(&Phase::Io));
    }

    #[tokio::test(start_paused = true)]
    async fn unreadable_file_is_recorded_not_raised() {
        let directory = tempfile::tempdir().expect("temp dir");
        let demo = SchedulingDemo::new(SchedulingConfig {
            read_path: Some(directory.path().join("missing.txt")),
            ..SchedulingConfig::default()
        });
        let journal = PhaseJournal::new();

        demo.run(&journal).await.expect("demo should succeed");

        assert!(io_message(&journal).contains("failed to read"));
    }

    #[tokio::test(start_paused = true)]
    async fn default_read_path_is_the_running_executable() {
        let executable = std::env::current_exe().expect("test executable path");
        let demo = SchedulingDemo::default();
        let journal = PhaseJournal::new();

        demo.run(&journal).await.expect("demo should succeed");

        let message = io_message(&journal);
        assert!(message.starts_with("C. read "), "io entry: {message}");
        assert!(message.ends_with(&executable.display().to_string()));
    }
}
