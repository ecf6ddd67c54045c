// --- File: crates/bookify_scheduling/src/outbox.rs ---
//! In-process notification outbox.
//!
//! Booking side effects are recorded here after the repository commit and
//! delivered by a background worker with bounded retry, so a flaky mail or
//! calendar provider can never make a correct booking appear to fail. The
//! idempotency key folds in `updated_at`, which de-duplicates accidental
//! double-enqueues of one mutation while still letting each later mutation
//! of the same appointment notify again.

use bookify_common::{Appointment, BoxedError, CustomerContact, NotificationDispatcher};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Confirmation,
    Update,
    CalendarCreate,
    CalendarUpdate,
    CalendarDelete,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Confirmation => "confirmation",
            NotificationKind::Update => "update",
            NotificationKind::CalendarCreate => "calendar_create",
            NotificationKind::CalendarUpdate => "calendar_update",
            NotificationKind::CalendarDelete => "calendar_delete",
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationTask {
    pub appointment: Appointment,
    pub contact: Option<CustomerContact>,
    pub kind: NotificationKind,
}

impl NotificationTask {
    pub fn confirmation(appointment: Appointment, contact: CustomerContact) -> Self {
        NotificationTask {
            appointment,
            contact: Some(contact),
            kind: NotificationKind::Confirmation,
        }
    }

    pub fn update(appointment: Appointment, contact: CustomerContact) -> Self {
        NotificationTask {
            appointment,
            contact: Some(contact),
            kind: NotificationKind::Update,
        }
    }

    pub fn calendar_create(appointment: Appointment) -> Self {
        NotificationTask {
            appointment,
            contact: None,
            kind: NotificationKind::CalendarCreate,
        }
    }

    pub fn calendar_update(appointment: Appointment) -> Self {
        NotificationTask {
            appointment,
            contact: None,
            kind: NotificationKind::CalendarUpdate,
        }
    }

    pub fn calendar_delete(appointment: Appointment) -> Self {
        NotificationTask {
            appointment,
            contact: None,
            kind: NotificationKind::CalendarDelete,
        }
    }

    pub fn idempotency_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.appointment.id,
            self.kind.as_str(),
            self.appointment.updated_at
        )
    }
}

#[derive(Debug, Clone)]
pub struct OutboxSettings {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for OutboxSettings {
    fn default() -> Self {
        OutboxSettings {
            max_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Handle the scheduling service enqueues through. Cheap to clone; the
/// worker task lives as long as any handle does.
#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<NotificationTask>,
}

impl Outbox {
    /// Spawns the delivery worker on the current tokio runtime.
    pub fn start(
        dispatcher: Arc<dyn NotificationDispatcher<Error = BoxedError>>,
        settings: OutboxSettings,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(rx, dispatcher, settings));
        Outbox { tx }
    }

    /// Fire-and-forget: the caller-visible operation never waits on, nor
    /// fails because of, delivery.
    pub fn enqueue(&self, task: NotificationTask) {
        debug!(key = %task.idempotency_key(), "queueing notification task");
        if self.tx.send(task).is_err() {
            warn!("notification worker is gone; dropping task");
        }
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<NotificationTask>,
    dispatcher: Arc<dyn NotificationDispatcher<Error = BoxedError>>,
    settings: OutboxSettings,
) {
    let mut delivered: HashSet<String> = HashSet::new();
    while let Some(task) = rx.recv().await {
        let key = task.idempotency_key();
        if delivered.contains(&key) {
            debug!(%key, "duplicate notification task skipped");
            continue;
        }
        if deliver_with_retry(dispatcher.as_ref(), &task, &settings).await {
            delivered.insert(key);
        }
    }
}

async fn deliver_with_retry(
    dispatcher: &dyn NotificationDispatcher<Error = BoxedError>,
    task: &NotificationTask,
    settings: &OutboxSettings,
) -> bool {
    let key = task.idempotency_key();
    for attempt in 1..=settings.max_attempts {
        match deliver(dispatcher, task).await {
            Ok(()) => {
                debug!(%key, attempt, "notification delivered");
                return true;
            }
            Err(e) => {
                warn!(%key, attempt, error = %e, "notification delivery failed");
                if attempt < settings.max_attempts {
                    tokio::time::sleep(settings.retry_delay).await;
                }
            }
        }
    }
    error!(%key, "giving up on notification task");
    false
}

async fn deliver(
    dispatcher: &dyn NotificationDispatcher<Error = BoxedError>,
    task: &NotificationTask,
) -> Result<(), BoxedError> {
    match task.kind {
        NotificationKind::Confirmation => match &task.contact {
            Some(contact) => {
                dispatcher
                    .send_confirmation(task.appointment.clone(), contact.clone())
                    .await?;
            }
            None => debug!(
                appointment_id = %task.appointment.id,
                "no contact on file, skipping confirmation"
            ),
        },
        NotificationKind::Update => match &task.contact {
            Some(contact) => {
                dispatcher
                    .send_update(task.appointment.clone(), contact.clone())
                    .await?;
            }
            None => debug!(
                appointment_id = %task.appointment.id,
                "no contact on file, skipping update notice"
            ),
        },
        NotificationKind::CalendarCreate => {
            let link = dispatcher
                .create_calendar_event(task.appointment.clone())
                .await?;
            if link.is_none() {
                debug!(appointment_id = %task.appointment.id, "calendar mirror returned no link");
            }
        }
        NotificationKind::CalendarUpdate => {
            let link = dispatcher
                .update_calendar_event(task.appointment.clone())
                .await?;
            if link.is_none() {
                debug!(appointment_id = %task.appointment.id, "calendar mirror returned no link");
            }
        }
        NotificationKind::CalendarDelete => {
            let status = dispatcher
                .delete_calendar_event(task.appointment.id)
                .await?;
            debug!(appointment_id = %task.appointment.id, %status, "calendar event removed");
        }
    }
    Ok(())
}
