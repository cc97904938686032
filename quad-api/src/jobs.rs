use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use quad_core::mailer::Mailer;
use quad_events::{EventKind, EventStore};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};

use crate::state::AppState;

/// A named periodic task. Runs execute sequentially inside one spawned
/// task, so two runs of the same job can never overlap, and every run's
/// outcome lands in the log.
pub struct JobRunner {
    name: &'static str,
    period: Duration,
}

impl JobRunner {
    pub fn new(name: &'static str, period: Duration) -> Self {
        Self { name, period }
    }

    pub fn spawn<F, Fut>(self, mut run: F) -> tokio::task::JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match run().await {
                    Ok(summary) => info!(job = self.name, "{}", summary),
                    Err(err) => error!(job = self.name, "job run failed: {:#}", err),
                }
            }
        })
    }
}

pub fn spawn_background_jobs(state: AppState) {
    let rules = state.business_rules.clone();
    let window = chrono::Duration::hours(rules.reminder_window_hours);

    let lifecycle = state.lifecycle.clone();
    JobRunner::new(
        "auto-cancel-sweep",
        Duration::from_secs(rules.auto_cancel_interval_seconds),
    )
    .spawn(move || {
        let lifecycle = lifecycle.clone();
        async move {
            let report = lifecycle.sweep_overdue(Utc::now()).await?;
            Ok(format!(
                "scanned {} lapsed requests, cancelled {}, {} failed",
                report.scanned, report.cancelled, report.failed
            ))
        }
    });

    let events = state.events.clone();
    let mailer = state.mailer.clone();
    JobRunner::new(
        "event-reminders",
        Duration::from_secs(rules.reminder_interval_seconds),
    )
    .spawn(move || {
        let events = events.clone();
        let mailer = mailer.clone();
        async move { run_event_reminders(events, mailer, window).await }
    });

    let events = state.events.clone();
    let mailer = state.mailer.clone();
    JobRunner::new(
        "payment-reminders",
        Duration::from_secs(rules.reminder_interval_seconds),
    )
    .spawn(move || {
        let events = events.clone();
        let mailer = mailer.clone();
        async move { run_payment_reminders(events, mailer, window).await }
    });
}

/// Events starting inside the window; a per-kind scan failure or a lost mail
/// is logged and skipped, never fatal to the run.
async fn run_event_reminders(
    events: Arc<dyn EventStore>,
    mailer: Arc<dyn Mailer>,
    window: chrono::Duration,
) -> anyhow::Result<String> {
    let now = Utc::now();
    let mut sent = 0usize;
    let mut failed = 0usize;

    for kind in EventKind::ALL {
        let batch = match events.list(kind, false).await {
            Ok(batch) => batch,
            Err(err) => {
                error!(kind = %kind, error = %err, "reminder scan failed for collection");
                failed += 1;
                continue;
            }
        };
        for event in batch {
            let Some(starts_at) = event.starts_at() else {
                continue;
            };
            if starts_at <= now || starts_at > now + window {
                continue;
            }
            let subject = format!("Upcoming event: {}", event.name());
            let body = format!(
                "Reminder: {} starts at {}.",
                event.name(),
                starts_at.format("%Y-%m-%d %H:%M")
            );
            for attendee in event.attendees() {
                match mailer.send(&attendee.email.0, &subject, &body).await {
                    Ok(()) => sent += 1,
                    Err(err) => {
                        failed += 1;
                        warn!(error = %err, "reminder delivery failed");
                    }
                }
            }
        }
    }
    Ok(format!("sent {sent} event reminders, {failed} failures"))
}

/// Nudge pending-payment registrants before their event starts.
async fn run_payment_reminders(
    events: Arc<dyn EventStore>,
    mailer: Arc<dyn Mailer>,
    window: chrono::Duration,
) -> anyhow::Result<String> {
    let now = Utc::now();
    let mut sent = 0usize;
    let mut failed = 0usize;

    for kind in EventKind::ALL {
        let batch = match events.list(kind, false).await {
            Ok(batch) => batch,
            Err(err) => {
                error!(kind = %kind, error = %err, "payment reminder scan failed for collection");
                failed += 1;
                continue;
            }
        };
        for event in batch {
            let Some(starts_at) = event.starts_at() else {
                continue;
            };
            if starts_at <= now || starts_at > now + window {
                continue;
            }
            let subject = format!("Payment reminder: {}", event.name());
            let body = format!(
                "Your registration for {} is still unpaid. Please pay before the event starts on {} or your spot lapses.",
                event.name(),
                starts_at.format("%Y-%m-%d %H:%M")
            );
            for registration in event.pending_registrations() {
                match mailer.send(&registration.email.0, &subject, &body).await {
                    Ok(()) => sent += 1,
                    Err(err) => {
                        failed += 1;
                        warn!(error = %err, "payment reminder delivery failed");
                    }
                }
            }
        }
    }
    Ok(format!("sent {sent} payment reminders, {failed} failures"))
}
