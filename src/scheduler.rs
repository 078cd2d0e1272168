// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::FeedError;
use crate::feed::FeedSource;
use crate::filter::CurrentEvent;
use crate::notify::{EventNotification, NotifierMux};
use crate::session::{CycleOutcome, FeedSession};

/// Subscribers see `None` until the first matching event.
pub type EventReceiver = watch::Receiver<Option<CurrentEvent>>;

/// Run one cycle and publish if the held event was replaced.
pub async fn run_cycle(
    session: &mut FeedSession,
    source: &dyn FeedSource,
    tx: &watch::Sender<Option<CurrentEvent>>,
    mux: &NotifierMux,
) -> Result<CycleOutcome, FeedError> {
    let outcome = session.poll(source).await?;
    if let CycleOutcome::Updated(ev) = &outcome {
        tx.send_replace(Some(ev.clone()));
        mux.notify(&EventNotification::new(session.name(), ev.clone()))
            .await;
    }
    Ok(outcome)
}

/// Spawn the poll loop. Cycles run inline in one task, so at most one is in
/// flight; ticks missed while a slow fetch runs are skipped, not queued.
pub fn spawn_poller(
    mut session: FeedSession,
    source: Arc<dyn FeedSource>,
    interval: Duration,
    mux: NotifierMux,
) -> (JoinHandle<()>, EventReceiver) {
    let (tx, rx) = watch::channel(None);
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(
            target: "p2000",
            session = %session.name(),
            source = source.name(),
            interval_secs = interval.as_secs(),
            "poller started"
        );
        loop {
            ticker.tick().await;
            // errors are logged by the session and retried next tick
            if let Ok(outcome) = run_cycle(&mut session, source.as_ref(), &tx, &mux).await {
                tracing::trace!(target: "p2000", ?outcome, "cycle done");
            }
        }
    });
    (handle, rx)
}
