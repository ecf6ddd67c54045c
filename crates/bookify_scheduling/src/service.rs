// --- File: crates/bookify_scheduling/src/service.rs ---
//! The scheduling orchestrator: booking state machine, availability
//! searches, alternative scanning and side-effect dispatch.

use crate::conflict::ConflictChecker;
use crate::error::SchedulingError;
use crate::outbox::{NotificationTask, Outbox};
use crate::ranking::{RankedSlot, RecommendationRanker};
use crate::slots::{BusinessHoursPolicy, SlotGenerator};
use bookify_common::{
    Appointment, AppointmentRepository, AppointmentStatus, BoxedError, GuardedWrite,
};
use bookify_config::SchedulingConfig;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const DEFAULT_DURATION_MINUTES: i64 = 60;
const DEFAULT_SEARCH_WINDOW_DAYS: i64 = 7;
const DEFAULT_ALTERNATIVES_PER_DAY: usize = 3;

/// Tunables that are not part of the business-hours policy itself.
#[derive(Debug, Clone)]
pub struct SchedulingSettings {
    pub default_duration_minutes: i64,
    pub search_window_days: i64,
    pub alternatives_per_day: usize,
}

impl SchedulingSettings {
    pub fn from_config(config: &SchedulingConfig) -> Self {
        SchedulingSettings {
            default_duration_minutes: config
                .default_duration_minutes
                .unwrap_or(DEFAULT_DURATION_MINUTES),
            search_window_days: config.search_window_days.unwrap_or(DEFAULT_SEARCH_WINDOW_DAYS),
            alternatives_per_day: config
                .alternatives_per_day
                .unwrap_or(DEFAULT_ALTERNATIVES_PER_DAY),
        }
    }
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self::from_config(&SchedulingConfig::default())
    }
}

/// Input for [`SchedulingService::book`].
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub customer_id: String,
    pub scheduled_at: NaiveDateTime,
    pub duration_minutes: Option<i64>,
    pub appointment_type: String,
    pub notes: Option<String>,
    pub contact_email: Option<String>,
    /// Administrative bypass of the conflict check. Explicit and audited,
    /// never a hidden toggle.
    pub force: bool,
    pub override_reason: Option<String>,
}

pub struct SchedulingService {
    repository: Arc<dyn AppointmentRepository<Error = BoxedError>>,
    checker: ConflictChecker,
    generator: SlotGenerator,
    ranker: RecommendationRanker,
    outbox: Outbox,
    settings: SchedulingSettings,
}

impl SchedulingService {
    pub fn new(
        repository: Arc<dyn AppointmentRepository<Error = BoxedError>>,
        outbox: Outbox,
        policy: BusinessHoursPolicy,
        ranker: RecommendationRanker,
        settings: SchedulingSettings,
    ) -> Self {
        let checker = ConflictChecker::new(repository.clone());
        SchedulingService {
            repository,
            checker,
            generator: SlotGenerator::new(policy),
            ranker,
            outbox,
            settings,
        }
    }

    /// Builds the service from the configured policy/ranker/settings.
    pub fn from_config(
        repository: Arc<dyn AppointmentRepository<Error = BoxedError>>,
        outbox: Outbox,
        config: &SchedulingConfig,
    ) -> Result<Self, SchedulingError> {
        Ok(Self::new(
            repository,
            outbox,
            BusinessHoursPolicy::from_config(config)?,
            RecommendationRanker::from_config(config),
            SchedulingSettings::from_config(config),
        ))
    }

    fn resolve_duration(&self, duration_minutes: Option<i64>) -> Result<Duration, SchedulingError> {
        let minutes = duration_minutes.unwrap_or(self.settings.default_duration_minutes);
        if minutes <= 0 {
            return Err(SchedulingError::Validation(
                "duration_minutes must be positive".to_string(),
            ));
        }
        Ok(Duration::minutes(minutes))
    }

    /// Free slots for a date, in preference order.
    pub async fn search_available_slots(
        &self,
        date: NaiveDate,
        duration_minutes: Option<i64>,
    ) -> Result<Vec<RankedSlot>, SchedulingError> {
        let duration = self.resolve_duration(duration_minutes)?;
        let mut free = Vec::new();
        for slot in self.generator.slots_for_date(date, duration) {
            if self.checker.is_slot_free(slot, duration).await? {
                free.push(slot);
            }
        }
        Ok(self.ranker.rank(free))
    }

    /// Books an appointment. Without `force`, a conflicting target returns
    /// [`SchedulingError::SlotConflict`] with ranked alternatives; with
    /// `force`, the check is bypassed and the override is logged.
    pub async fn book(&self, request: BookingRequest) -> Result<Appointment, SchedulingError> {
        if request.customer_id.trim().is_empty() {
            return Err(SchedulingError::Validation(
                "customer_id must not be empty".to_string(),
            ));
        }
        let duration = self.resolve_duration(request.duration_minutes)?;

        let now = Local::now().naive_local();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            customer_id: request.customer_id,
            scheduled_at: request.scheduled_at,
            duration_minutes: duration.num_minutes(),
            status: AppointmentStatus::Scheduled,
            appointment_type: request.appointment_type,
            notes: request.notes,
            contact_email: request.contact_email,
            created_at: now,
            updated_at: now,
        };

        let stored = if request.force {
            warn!(
                appointment_id = %appointment.id,
                customer_id = %appointment.customer_id,
                scheduled_at = %appointment.scheduled_at,
                reason = request.override_reason.as_deref().unwrap_or("none given"),
                "conflict check bypassed by operator override"
            );
            self.repository.insert(appointment).await?
        } else {
            match self.repository.insert_if_free(appointment).await? {
                GuardedWrite::Committed(stored) => stored,
                GuardedWrite::SlotTaken(_) => {
                    let alternatives = self
                        .alternatives_after(request.scheduled_at, duration)
                        .await?;
                    return Err(SchedulingError::SlotConflict {
                        requested: request.scheduled_at,
                        alternatives,
                    });
                }
            }
        };

        info!(
            appointment_id = %stored.id,
            scheduled_at = %stored.scheduled_at,
            "appointment booked"
        );
        self.outbox
            .enqueue(NotificationTask::calendar_create(stored.clone()));
        if let Some(contact) = stored.contact() {
            self.outbox
                .enqueue(NotificationTask::confirmation(stored.clone(), contact));
        }
        Ok(stored)
    }

    /// Moves a `Scheduled` appointment to a new start time in place.
    pub async fn reschedule(
        &self,
        id: Uuid,
        new_start: NaiveDateTime,
    ) -> Result<Appointment, SchedulingError> {
        let mut appointment = self
            .repository
            .get(id)
            .await?
            .ok_or(SchedulingError::NotFound(id))?;
        if appointment.status.is_terminal() {
            return Err(SchedulingError::Terminal {
                id,
                status: appointment.status,
            });
        }

        let duration = Duration::minutes(appointment.duration_minutes);
        appointment.scheduled_at = new_start;
        appointment.updated_at = Local::now().naive_local();

        match self.repository.update_if_free(appointment).await? {
            GuardedWrite::Committed(stored) => {
                info!(
                    appointment_id = %stored.id,
                    scheduled_at = %stored.scheduled_at,
                    "appointment rescheduled"
                );
                self.outbox
                    .enqueue(NotificationTask::calendar_update(stored.clone()));
                if let Some(contact) = stored.contact() {
                    self.outbox
                        .enqueue(NotificationTask::update(stored.clone(), contact));
                }
                Ok(stored)
            }
            GuardedWrite::SlotTaken(_) => {
                let alternatives = self.alternatives_after(new_start, duration).await?;
                Err(SchedulingError::SlotConflict {
                    requested: new_start,
                    alternatives,
                })
            }
        }
    }

    /// Cancels without deleting: the record stays for history, the slot is
    /// freed for future bookings.
    pub async fn cancel(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        let stored = self
            .transition(id, AppointmentStatus::Cancelled)
            .await?;
        self.outbox
            .enqueue(NotificationTask::calendar_delete(stored.clone()));
        Ok(stored)
    }

    pub async fn complete(&self, id: Uuid) -> Result<Appointment, SchedulingError> {
        self.transition(id, AppointmentStatus::Completed).await
    }

    async fn transition(
        &self,
        id: Uuid,
        to: AppointmentStatus,
    ) -> Result<Appointment, SchedulingError> {
        let mut appointment = self
            .repository
            .get(id)
            .await?
            .ok_or(SchedulingError::NotFound(id))?;
        if appointment.status.is_terminal() {
            return Err(SchedulingError::Terminal {
                id,
                status: appointment.status,
            });
        }
        appointment.status = to;
        appointment.updated_at = Local::now().naive_local();
        let stored = self.repository.update(appointment).await?;
        info!(appointment_id = %stored.id, status = %stored.status, "appointment state changed");
        Ok(stored)
    }

    /// Hard removal, as opposed to `cancel`: the record disappears and the
    /// mirrored calendar event is taken down with it.
    pub async fn delete(&self, id: Uuid) -> Result<(), SchedulingError> {
        let appointment = self
            .repository
            .get(id)
            .await?
            .ok_or(SchedulingError::NotFound(id))?;
        self.repository.delete(id).await?;
        info!(appointment_id = %id, "appointment deleted");
        self.outbox
            .enqueue(NotificationTask::calendar_delete(appointment));
        Ok(())
    }

    pub async fn list_upcoming(
        &self,
        within_days: i64,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        if within_days <= 0 {
            return Err(SchedulingError::Validation(
                "days must be positive".to_string(),
            ));
        }
        let from = Local::now().naive_local();
        Ok(self.repository.find_upcoming(from, within_days).await?)
    }

    pub async fn list_for_customer(
        &self,
        customer_id: &str,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self.repository.find_by_customer(customer_id).await?)
    }

    /// Forward scan for bookable alternatives: up to `alternatives_per_day`
    /// free slots per day over the search window, then ranked and capped.
    async fn alternatives_after(
        &self,
        requested: NaiveDateTime,
        duration: Duration,
    ) -> Result<Vec<RankedSlot>, SchedulingError> {
        let mut pool = Vec::new();
        for offset in 0..self.settings.search_window_days {
            let date = requested.date() + Duration::days(offset);
            let mut collected = 0usize;
            for slot in self.generator.slots_for_date(date, duration) {
                if collected >= self.settings.alternatives_per_day {
                    break;
                }
                if offset == 0 && slot <= requested {
                    continue;
                }
                if self.checker.is_slot_free(slot, duration).await? {
                    pool.push(slot);
                    collected += 1;
                }
            }
        }
        Ok(self.ranker.top(pool))
    }
}
