//! Appointment reminder dispatch.
//!
//! A periodically polled job scans the appointment book in two lookahead
//! windows - roughly a day ahead and a couple of hours ahead - and sends one
//! WhatsApp-style message per `(appointment, kind)` through the external
//! messaging gateway behind [`MessageSender`]. Each delivery attempt is logged
//! to the appointment book's reminder log with its outcome.
//!
//! Skip rules, in order:
//! - the appointment's patient has no phone contact,
//! - a reminder of the same kind was already logged for the appointment.
//!
//! One attempt per poll, no retry or backoff: a failed delivery is logged and
//! the next poll will not retry it (the log entry exists). The dedup check is
//! a file-existence read with no transactional guard, so two pollers running
//! concurrently could both pass it and double-send; DCR runs a single
//! in-process poller, which is what keeps that race dormant rather than any
//! guarantee from the store.

use crate::author::Author;
use crate::config::CoreConfig;
use crate::error::RecordResult;
use crate::repositories::appointments::{Appointment, AppointmentService};
use crate::repositories::patients::{PatientRecord, PatientService};
use chrono::{DateTime, Duration, Utc};
use dcr_types::PhoneNumber;
use dcr_uuid::ShardedUuid;
use std::str::FromStr;
use std::sync::Arc;

/// The two reminder kinds, each with its own lookahead window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    /// Sent roughly 24 hours before the appointment.
    DayBefore,
    /// Sent roughly 2 hours before the appointment.
    Soon,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 2] = [ReminderKind::DayBefore, ReminderKind::Soon];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DayBefore => "day_before",
            Self::Soon => "soon",
        }
    }

    /// How far ahead of `now` this kind's window begins.
    pub fn lookahead(self) -> Duration {
        match self {
            Self::DayBefore => Duration::hours(24),
            Self::Soon => Duration::hours(2),
        }
    }

    /// Width of the scan window. Wide enough that an appointment is seen by
    /// at least one poll even with jittery polling intervals.
    pub fn window_width(self) -> Duration {
        match self {
            Self::DayBefore => Duration::minutes(30),
            Self::Soon => Duration::minutes(15),
        }
    }
}

impl FromStr for ReminderKind {
    type Err = crate::RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day_before" => Ok(Self::DayBefore),
            "soon" => Ok(Self::Soon),
            other => Err(crate::RecordError::InvalidInput(format!(
                "unknown reminder kind: '{}'",
                other
            ))),
        }
    }
}

/// Outcome of one delivery attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Sent,
    Failed,
}

/// One logged reminder delivery attempt.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReminderRecord {
    pub appointment_id: ShardedUuid,
    pub kind: ReminderKind,
    pub phone: PhoneNumber,
    pub sent_at: DateTime<Utc>,
    pub outcome: DeliveryOutcome,
    /// Gateway error text for failed deliveries.
    #[serde(default)]
    pub detail: Option<String>,
}

/// Error returned by a messaging gateway.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MessageSendError(pub String);

/// Boundary to the external messaging gateway.
///
/// The gateway's wire protocol is not owned here; implementations adapt
/// whatever HTTP client or SDK the deployment uses. Test code substitutes a
/// recording double.
pub trait MessageSender: Send + Sync {
    fn send(&self, to: &PhoneNumber, body: &str) -> Result<(), MessageSendError>;
}

/// A sender that only logs the message.
///
/// Default wiring when no gateway is configured, so development environments
/// exercise the full dispatch path without sending anything.
#[derive(Debug, Default)]
pub struct TracingSender;

impl MessageSender for TracingSender {
    fn send(&self, to: &PhoneNumber, body: &str) -> Result<(), MessageSendError> {
        tracing::info!(phone = %to, body, "reminder message (tracing sender, not delivered)");
        Ok(())
    }
}

/// Counters from one polling pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct PollSummary {
    pub considered: usize,
    pub sent: usize,
    pub failed: usize,
    pub skipped_no_phone: usize,
    pub skipped_already_sent: usize,
}

/// The reminder polling job.
pub struct ReminderDispatcher {
    cfg: Arc<CoreConfig>,
    sender: Arc<dyn MessageSender>,
}

impl ReminderDispatcher {
    pub fn new(cfg: Arc<CoreConfig>, sender: Arc<dyn MessageSender>) -> Self {
        Self { cfg, sender }
    }

    /// Runs one polling pass at the given instant.
    ///
    /// Commits under the system author identity with the clinic name as the
    /// care location.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` only for reminder-log persistence failures;
    /// per-appointment problems (missing patient record, gateway failure) are
    /// logged and counted, not raised, so one bad appointment cannot stall
    /// the rest of the pass.
    pub fn poll_once(&self, now: DateTime<Utc>) -> RecordResult<PollSummary> {
        let appointments = AppointmentService::new(self.cfg.clone());
        let author = Author::system(self.cfg.clinic_name());
        let care_location = self.cfg.clinic_name().clone();

        let mut summary = PollSummary::default();

        for kind in ReminderKind::ALL {
            let window_start = now + kind.lookahead();
            let window_end = window_start + kind.window_width();

            for appointment in appointments.scheduled_between(window_start, window_end) {
                summary.considered += 1;

                let Some(patient) = self.patient_for(&appointment) else {
                    summary.skipped_no_phone += 1;
                    continue;
                };
                let Some(phone) = patient.phone.clone() else {
                    tracing::debug!(
                        appointment = %appointment.id,
                        "skipping reminder: patient has no phone contact"
                    );
                    summary.skipped_no_phone += 1;
                    continue;
                };

                if appointments.reminder_sent(&appointment.id, kind) {
                    summary.skipped_already_sent += 1;
                    continue;
                }

                let body = compose_message(&patient, &appointment);
                let (outcome, detail) = match self.sender.send(&phone, &body) {
                    Ok(()) => {
                        summary.sent += 1;
                        (DeliveryOutcome::Sent, None)
                    }
                    Err(e) => {
                        tracing::warn!(
                            appointment = %appointment.id,
                            error = %e,
                            "reminder delivery failed"
                        );
                        summary.failed += 1;
                        (DeliveryOutcome::Failed, Some(e.to_string()))
                    }
                };

                let record = ReminderRecord {
                    appointment_id: appointment.id.clone(),
                    kind,
                    phone,
                    sent_at: now,
                    outcome,
                    detail,
                };
                appointments.record_reminder(&author, care_location.clone(), &record)?;
            }
        }

        Ok(summary)
    }

    fn patient_for(&self, appointment: &Appointment) -> Option<PatientRecord> {
        let service =
            PatientService::with_id(self.cfg.clone(), &appointment.patient_id.to_string()).ok()?;
        match service.record() {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    appointment = %appointment.id,
                    patient = %appointment.patient_id,
                    error = %e,
                    "skipping reminder: patient record unavailable"
                );
                None
            }
        }
    }
}

/// The reminder message text.
fn compose_message(patient: &PatientRecord, appointment: &Appointment) -> String {
    let name = match patient.display_name() {
        n if n.is_empty() => "paciente".to_string(),
        n => n,
    };
    format!(
        "Hola {}, le recordamos su cita dental el {} UTC. Si necesita reagendar, responda a este mensaje.",
        name,
        appointment.starts_at.format("%d/%m/%Y %H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::appointments::AppointmentService;
    use crate::repositories::patients::PatientService;
    use dcr_types::NonEmptyText;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every send; optionally fails them all.
    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    impl MessageSender for RecordingSender {
        fn send(&self, to: &PhoneNumber, body: &str) -> Result<(), MessageSendError> {
            self.sent
                .lock()
                .unwrap()
                .push((to.as_str().to_owned(), body.to_owned()));
            if self.fail {
                Err(MessageSendError("gateway unavailable".into()))
            } else {
                Ok(())
            }
        }
    }

    fn test_author() -> Author {
        Author {
            name: NonEmptyText::new("Front Desk").unwrap(),
            role: NonEmptyText::new("Receptionist").unwrap(),
            email: NonEmptyText::new("desk@example.com").unwrap(),
            registrations: vec![],
        }
    }

    fn test_cfg(dir: &std::path::Path) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(
                dir.to_path_buf(),
                NonEmptyText::new("Clinica Dental Sol").unwrap(),
            )
            .unwrap(),
        )
    }

    fn care_location() -> NonEmptyText {
        NonEmptyText::new("Clinica Dental Sol").unwrap()
    }

    fn setup_patient(cfg: &Arc<CoreConfig>, phone: Option<&str>) -> ShardedUuid {
        let patient = PatientService::new(cfg.clone())
            .initialise(test_author(), care_location())
            .unwrap();
        patient
            .update(
                &test_author(),
                care_location(),
                vec!["Maria".to_string()],
                "Gomez",
                None,
                phone.map(|p| PhoneNumber::parse(p).unwrap()),
            )
            .unwrap();
        patient.patient_id().clone()
    }

    fn book_in(
        cfg: &Arc<CoreConfig>,
        patient_id: &ShardedUuid,
        now: DateTime<Utc>,
        ahead: Duration,
    ) -> ShardedUuid {
        AppointmentService::new(cfg.clone())
            .book(
                &test_author(),
                care_location(),
                patient_id,
                now + ahead,
                None,
            )
            .unwrap()
            .id
    }

    #[test]
    fn sends_a_day_before_reminder_and_logs_it() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let now = Utc::now();

        let patient_id = setup_patient(&cfg, Some("+525512345678"));
        let appointment_id =
            book_in(&cfg, &patient_id, now, Duration::hours(24) + Duration::minutes(5));

        let sender = Arc::new(RecordingSender::default());
        let dispatcher = ReminderDispatcher::new(cfg.clone(), sender.clone());

        let summary = dispatcher.poll_once(now).unwrap();
        assert_eq!(summary.sent, 1);
        assert_eq!(summary.failed, 0);

        let sent = sender.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "+525512345678");
        assert!(sent[0].1.contains("Maria Gomez"));

        let appointments = AppointmentService::new(cfg);
        assert!(appointments.reminder_sent(&appointment_id, ReminderKind::DayBefore));
        assert!(!appointments.reminder_sent(&appointment_id, ReminderKind::Soon));
    }

    #[test]
    fn second_poll_deduplicates_by_kind() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let now = Utc::now();

        let patient_id = setup_patient(&cfg, Some("+525512345678"));
        book_in(&cfg, &patient_id, now, Duration::hours(24) + Duration::minutes(5));

        let sender = Arc::new(RecordingSender::default());
        let dispatcher = ReminderDispatcher::new(cfg, sender.clone());

        let first = dispatcher.poll_once(now).unwrap();
        assert_eq!(first.sent, 1);

        let second = dispatcher.poll_once(now).unwrap();
        assert_eq!(second.sent, 0);
        assert_eq!(second.skipped_already_sent, 1);
        assert_eq!(sender.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn skips_patient_without_phone() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let now = Utc::now();

        let patient_id = setup_patient(&cfg, None);
        let appointment_id =
            book_in(&cfg, &patient_id, now, Duration::hours(2) + Duration::minutes(5));

        let sender = Arc::new(RecordingSender::default());
        let dispatcher = ReminderDispatcher::new(cfg.clone(), sender.clone());

        let summary = dispatcher.poll_once(now).unwrap();
        assert_eq!(summary.sent, 0);
        assert_eq!(summary.skipped_no_phone, 1);
        assert!(sender.sent.lock().unwrap().is_empty());

        // No delivery record is written for a skip.
        let appointments = AppointmentService::new(cfg);
        assert!(appointments.reminders_for(&appointment_id).is_empty());
    }

    #[test]
    fn appointment_outside_every_window_is_ignored() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let now = Utc::now();

        let patient_id = setup_patient(&cfg, Some("+525512345678"));
        book_in(&cfg, &patient_id, now, Duration::hours(48));

        let sender = Arc::new(RecordingSender::default());
        let dispatcher = ReminderDispatcher::new(cfg, sender.clone());

        let summary = dispatcher.poll_once(now).unwrap();
        assert_eq!(summary.considered, 0);
        assert!(sender.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_delivery_is_logged_and_not_retried() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let now = Utc::now();

        let patient_id = setup_patient(&cfg, Some("+525512345678"));
        let appointment_id =
            book_in(&cfg, &patient_id, now, Duration::hours(2) + Duration::minutes(5));

        let sender = Arc::new(RecordingSender {
            fail: true,
            ..Default::default()
        });
        let dispatcher = ReminderDispatcher::new(cfg.clone(), sender.clone());

        let summary = dispatcher.poll_once(now).unwrap();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.sent, 0);

        let appointments = AppointmentService::new(cfg);
        let records = appointments.reminders_for(&appointment_id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, DeliveryOutcome::Failed);
        assert_eq!(records[0].detail.as_deref(), Some("gateway unavailable"));

        // The log entry exists, so the next poll does not attempt again.
        let second = dispatcher.poll_once(now).unwrap();
        assert_eq!(second.skipped_already_sent, 1);
        assert_eq!(sender.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn both_kinds_fire_for_their_own_windows() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let now = Utc::now();

        let patient_id = setup_patient(&cfg, Some("+525512345678"));
        book_in(&cfg, &patient_id, now, Duration::hours(24) + Duration::minutes(5));
        book_in(&cfg, &patient_id, now, Duration::hours(2) + Duration::minutes(5));

        let sender = Arc::new(RecordingSender::default());
        let dispatcher = ReminderDispatcher::new(cfg, sender.clone());

        let summary = dispatcher.poll_once(now).unwrap();
        assert_eq!(summary.sent, 2);
    }
}
