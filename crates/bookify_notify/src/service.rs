// --- File: crates/bookify_notify/src/service.rs ---
//! Webhook implementations of the notification dispatcher.
//!
//! Confirmation/update mails go to the mail gateway, calendar mirroring to
//! the calendar webhook. Everything returns through `BoxedError` so the
//! outbox can treat every backend uniformly.

use crate::error::NotifyError;
use bookify_common::services::{BoxFuture, BoxedError, NotificationDispatcher, NotificationResult};
use bookify_common::{Appointment, CustomerContact};
use bookify_config::NotifyConfig;
use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Shared HTTP client for dispatchers built without an explicit timeout.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client")
});

fn boxed(err: NotifyError) -> BoxedError {
    BoxedError(Box::new(err))
}

fn appointment_when(appointment: &Appointment) -> String {
    format!(
        "{} at {}",
        appointment.scheduled_at.format("%A, %B %-d"),
        appointment.scheduled_at.format("%-I:%M %p")
    )
}

/// Posts JSON to the configured mail-gateway / calendar-mirror endpoints.
#[derive(Clone)]
pub struct WebhookDispatcher {
    client: Client,
    mail_gateway_url: Option<String>,
    calendar_webhook_url: Option<String>,
}

impl WebhookDispatcher {
    pub fn new(config: &NotifyConfig) -> Self {
        let client = match config.timeout_secs {
            Some(secs) => Client::builder()
                .timeout(Duration::from_secs(secs))
                .build()
                .unwrap_or_else(|_| HTTP_CLIENT.clone()),
            None => HTTP_CLIENT.clone(),
        };
        WebhookDispatcher {
            client,
            mail_gateway_url: config.mail_gateway_url.clone(),
            calendar_webhook_url: config.calendar_webhook_url.clone(),
        }
    }

    fn mail_url(&self) -> Result<String, NotifyError> {
        self.mail_gateway_url
            .clone()
            .ok_or(NotifyError::NotConfigured("mail_gateway_url"))
    }

    fn calendar_url(&self) -> Result<String, NotifyError> {
        self.calendar_webhook_url
            .clone()
            .ok_or(NotifyError::NotConfigured("calendar_webhook_url"))
    }

    async fn send_mail(
        client: Client,
        url: String,
        contact: CustomerContact,
        subject: String,
        body: String,
        appointment_id: Uuid,
    ) -> Result<NotificationResult, NotifyError> {
        let response = client
            .post(format!("{}/send", url.trim_end_matches('/')))
            .json(&serde_json::json!({
                "to": contact.email,
                "subject": subject,
                "body": body,
                "appointment_id": appointment_id,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Gateway(response.status().as_u16()));
        }
        let payload: serde_json::Value = response.json().await.unwrap_or_default();
        Ok(NotificationResult {
            id: payload
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string(),
            status: "sent".to_string(),
        })
    }

    async fn mirror_event(
        client: Client,
        url: String,
        appointment: Appointment,
        update: bool,
    ) -> Result<Option<String>, NotifyError> {
        let base = url.trim_end_matches('/').to_string();
        let payload = serde_json::json!({
            "appointment_id": appointment.id,
            "summary": format!("{} ({})", appointment.appointment_type, appointment.customer_id),
            "start_time": appointment.scheduled_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "end_time": appointment.end_time().format("%Y-%m-%dT%H:%M:%S").to_string(),
            "description": appointment.notes,
        });

        let request = if update {
            client.put(format!("{}/events/{}", base, appointment.id))
        } else {
            client.post(format!("{}/events", base))
        };
        let response = request.json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(NotifyError::Gateway(response.status().as_u16()));
        }
        let payload: serde_json::Value = response.json().await.unwrap_or_default();
        Ok(payload
            .get("link")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }
}

impl NotificationDispatcher for WebhookDispatcher {
    type Error = BoxedError;

    fn send_confirmation(
        &self,
        appointment: Appointment,
        contact: CustomerContact,
    ) -> BoxFuture<'static, NotificationResult, Self::Error> {
        let client = self.client.clone();
        let url = self.mail_url();
        Box::pin(async move {
            let url = url.map_err(boxed)?;
            let subject = "Your appointment is confirmed".to_string();
            let body = format!(
                "Your {} is booked for {}.",
                appointment.appointment_type,
                appointment_when(&appointment)
            );
            Self::send_mail(client, url, contact, subject, body, appointment.id)
                .await
                .map_err(boxed)
        })
    }

    fn send_update(
        &self,
        appointment: Appointment,
        contact: CustomerContact,
    ) -> BoxFuture<'static, NotificationResult, Self::Error> {
        let client = self.client.clone();
        let url = self.mail_url();
        Box::pin(async move {
            let url = url.map_err(boxed)?;
            let subject = "Your appointment was updated".to_string();
            let body = format!(
                "Your {} has been moved to {}.",
                appointment.appointment_type,
                appointment_when(&appointment)
            );
            Self::send_mail(client, url, contact, subject, body, appointment.id)
                .await
                .map_err(boxed)
        })
    }

    fn create_calendar_event(
        &self,
        appointment: Appointment,
    ) -> BoxFuture<'static, Option<String>, Self::Error> {
        let client = self.client.clone();
        let url = self.calendar_url();
        Box::pin(async move {
            let url = url.map_err(boxed)?;
            Self::mirror_event(client, url, appointment, false)
                .await
                .map_err(boxed)
        })
    }

    fn update_calendar_event(
        &self,
        appointment: Appointment,
    ) -> BoxFuture<'static, Option<String>, Self::Error> {
        let client = self.client.clone();
        let url = self.calendar_url();
        Box::pin(async move {
            let url = url.map_err(boxed)?;
            Self::mirror_event(client, url, appointment, true)
                .await
                .map_err(boxed)
        })
    }

    fn delete_calendar_event(
        &self,
        appointment_id: Uuid,
    ) -> BoxFuture<'static, String, Self::Error> {
        let client = self.client.clone();
        let url = self.calendar_url();
        Box::pin(async move {
            let url = url.map_err(boxed)?;
            let response = client
                .delete(format!(
                    "{}/events/{}",
                    url.trim_end_matches('/'),
                    appointment_id
                ))
                .send()
                .await
                .map_err(|e| boxed(NotifyError::Http(e)))?;
            if !response.status().is_success() {
                return Err(boxed(NotifyError::Gateway(response.status().as_u16())));
            }
            Ok(format!("event for appointment {appointment_id} removed"))
        })
    }
}

/// Stand-in dispatcher for deployments with notifications switched off.
/// Every call succeeds and is logged at debug level.
#[derive(Debug, Clone, Default)]
pub struct NoopDispatcher;

impl NotificationDispatcher for NoopDispatcher {
    type Error = BoxedError;

    fn send_confirmation(
        &self,
        appointment: Appointment,
        contact: CustomerContact,
    ) -> BoxFuture<'static, NotificationResult, Self::Error> {
        Box::pin(async move {
            debug!(appointment_id = %appointment.id, to = %contact.email, "noop confirmation");
            Ok(NotificationResult {
                id: String::new(),
                status: "skipped".to_string(),
            })
        })
    }

    fn send_update(
        &self,
        appointment: Appointment,
        contact: CustomerContact,
    ) -> BoxFuture<'static, NotificationResult, Self::Error> {
        Box::pin(async move {
            debug!(appointment_id = %appointment.id, to = %contact.email, "noop update notice");
            Ok(NotificationResult {
                id: String::new(),
                status: "skipped".to_string(),
            })
        })
    }

    fn create_calendar_event(
        &self,
        appointment: Appointment,
    ) -> BoxFuture<'static, Option<String>, Self::Error> {
        Box::pin(async move {
            debug!(appointment_id = %appointment.id, "noop calendar create");
            Ok(None)
        })
    }

    fn update_calendar_event(
        &self,
        appointment: Appointment,
    ) -> BoxFuture<'static, Option<String>, Self::Error> {
        Box::pin(async move {
            debug!(appointment_id = %appointment.id, "noop calendar update");
            Ok(None)
        })
    }

    fn delete_calendar_event(
        &self,
        appointment_id: Uuid,
    ) -> BoxFuture<'static, String, Self::Error> {
        Box::pin(async move {
            debug!(%appointment_id, "noop calendar delete");
            Ok("skipped".to_string())
        })
    }
}
