//! Scenario replay — feeds snapshots to the rule engine through an event loop.
//!
//! A producer task publishes each snapshot at its offset. The consumer loop
//! owns the engine and runs one evaluation pass per event. Rules parked by a
//! pass get a re-check event scheduled after their delay. The loop ends once
//! the producer is done and no re-check is pending.

use std::sync::Arc;
use std::time::Duration;

use autotap_adapter_virtual::{VirtualHost, VirtualSelectorEngine, VirtualTree};
use autotap_app::ports::Clock;
use autotap_app::rule_engine::{FiredRule, RuleEngine};
use autotap_app::services::rule_loader;
use autotap_app::trigger_registry::WatchTriggerRegistry;
use autotap_domain::error::AutotapError;
use autotap_domain::id::RuleId;
use autotap_domain::time::{Millis, duration_millis, now_millis};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::scenario::{Scenario, Snapshot};

const EVENT_CAPACITY: usize = 64;

/// Wall clock that follows tokio's (pausable) time.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
    base: Millis,
}

impl TokioClock {
    /// Start counting from the current tokio instant and wall-clock time.
    #[must_use]
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
            base: now_millis(),
        }
    }

    #[must_use]
    pub fn origin(&self) -> Instant {
        self.origin
    }

    /// Time since [`TokioClock::start`].
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Clock for TokioClock {
    fn now_millis(&self) -> Millis {
        self.base.saturating_add(duration_millis(self.elapsed()))
    }
}

/// Events consumed by the replay loop.
#[derive(Debug)]
enum HostEvent {
    /// The foreground window changed.
    Window {
        activity_id: Option<String>,
        window: Option<VirtualTree>,
    },
    /// A parked rule's delay has elapsed.
    Recheck(RuleId),
    /// No more snapshots will follow.
    End,
}

/// A rule firing observed during a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing {
    /// Offset from the start of the replay.
    pub at: Duration,
    pub activity_id: Option<String>,
    pub rule: FiredRule,
}

/// What happened during a replay.
#[derive(Debug, Default)]
pub struct ReplaySummary {
    pub passes: usize,
    pub firings: Vec<Firing>,
}

/// Replay errors.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The scenario's rules could not be assembled.
    #[error("failed to load rules")]
    Rules(#[from] AutotapError),
    /// The snapshot producer task panicked or was cancelled.
    #[error("snapshot producer failed")]
    Producer(#[from] tokio::task::JoinError),
}

/// Replay `scenario` against `host`.
///
/// # Errors
///
/// Returns [`ReplayError::Rules`] when the scenario's rules are invalid, or
/// [`ReplayError::Producer`] when the snapshot producer task fails.
#[tracing::instrument(skip_all, fields(app = %scenario.app.id, snapshots = scenario.snapshots.len()))]
pub async fn run(scenario: Scenario, host: Arc<VirtualHost>) -> Result<ReplaySummary, ReplayError> {
    let selectors = VirtualSelectorEngine;
    let rules = rule_loader::assemble_rules(scenario.subs_item, scenario.app, |source| {
        selectors.compile(source)
    })?;

    let clock = TokioClock::start();
    let registry = Arc::new(WatchTriggerRegistry::new());
    let engine = RuleEngine::new(selectors, Arc::clone(&host), clock, registry, rules);

    let (sender, events) = mpsc::channel(EVENT_CAPACITY);
    let producer = tokio::spawn(produce(scenario.snapshots, clock.origin(), sender.clone()));

    let summary = drive(engine, &host, clock, sender, events, producer).await?;
    tracing::info!(
        passes = summary.passes,
        firings = summary.firings.len(),
        "replay finished"
    );
    Ok(summary)
}

type ReplayEngine =
    RuleEngine<VirtualSelectorEngine, Arc<VirtualHost>, TokioClock, Arc<WatchTriggerRegistry>>;

/// Consume host events until the producer is done and no re-check is pending.
///
/// The loop keeps a sender for re-checks, so the channel never closes on its
/// own; the producer handle is polled alongside it so a failed producer ends
/// the replay instead of leaving it waiting for `End`.
async fn drive(
    mut engine: ReplayEngine,
    host: &VirtualHost,
    clock: TokioClock,
    sender: mpsc::Sender<HostEvent>,
    mut events: mpsc::Receiver<HostEvent>,
    mut producer: JoinHandle<()>,
) -> Result<ReplaySummary, ReplayError> {
    let mut summary = ReplaySummary::default();
    let mut activity_id: Option<String> = None;
    let mut ended = false;
    let mut produced = false;
    let mut pending = 0_usize;

    while !(ended && pending == 0) {
        let event = tokio::select! {
            event = events.recv() => event,
            joined = &mut producer, if !produced => {
                produced = true;
                joined?;
                continue;
            }
        };
        let Some(event) = event else {
            break;
        };
        match event {
            HostEvent::Window {
                activity_id: next,
                window,
            } => {
                tracing::debug!(activity = ?next, "window changed");
                host.set_window(window);
                activity_id = next;
            }
            HostEvent::Recheck(rule_id) => {
                pending = pending.saturating_sub(1);
                tracing::debug!(%rule_id, "re-checking delayed rule");
            }
            HostEvent::End => {
                ended = true;
                continue;
            }
        }

        let report = engine.process_snapshot(activity_id.as_deref());
        summary.passes += 1;

        for delayed in report.delayed {
            pending += 1;
            schedule_recheck(sender.clone(), delayed.rule_id, delayed.retry_after);
        }
        if let Some(rule) = report.fired {
            summary.firings.push(Firing {
                at: clock.elapsed(),
                activity_id: activity_id.clone(),
                rule,
            });
        }
    }

    if !produced {
        producer.await?;
    }
    Ok(summary)
}

async fn produce(snapshots: Vec<Snapshot>, origin: Instant, sender: mpsc::Sender<HostEvent>) {
    for snapshot in snapshots {
        tokio::time::sleep_until(origin + Duration::from_millis(snapshot.at_ms)).await;
        let event = HostEvent::Window {
            activity_id: snapshot.activity_id,
            window: snapshot.root.as_ref().map(VirtualTree::from_record),
        };
        if sender.send(event).await.is_err() {
            return;
        }
    }
    if sender.send(HostEvent::End).await.is_err() {
        tracing::debug!("replay loop gone before end of snapshots");
    }
}

fn schedule_recheck(sender: mpsc::Sender<HostEvent>, rule_id: RuleId, after: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        if sender.send(HostEvent::Recheck(rule_id)).await.is_err() {
            tracing::debug!(%rule_id, "replay loop gone before re-check");
        }
    });
}
