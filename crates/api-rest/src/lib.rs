//! # API REST
//!
//! REST API implementation for DCR.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, error-to-status mapping)
//!
//! All domain logic lives in `dcr-core`; handlers construct the relevant core
//! service from the shared [`AppState`] configuration and translate between
//! API bodies and core types. Timestamps cross the API boundary as RFC 3339
//! strings.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};

use dcr_core::{
    diff_charts, Appointment, AppointmentService, Author, AuthorRegistration, CoreConfig,
    NonEmptyText, OdontogramService, OdontogramVersion, PatientRecord, PatientService,
    PhoneNumber, RecordError, ReminderRecord, ToothChart, VersionKind,
};

/// Application state shared across REST API handlers.
///
/// Carries the startup-resolved configuration; services are constructed per
/// request from it.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        create_patient,
        update_patient,
        new_version,
        timeline,
        current_baseline,
        read_version,
        diff_versions,
        book_appointment,
        list_appointments,
        cancel_appointment,
        list_reminders,
    ),
    components(schemas(
        HealthRes,
        AuthorRegistrationReq,
        PatientRes,
        ListPatientsRes,
        CreatePatientReq,
        CreatePatientRes,
        UpdatePatientReq,
        UpdatePatientRes,
        NewVersionReq,
        VersionRes,
        TimelineRes,
        DiffChangeRes,
        DiffRes,
        BookAppointmentReq,
        AppointmentRes,
        ListAppointmentsRes,
        CancelAppointmentReq,
        CancelAppointmentRes,
        ReminderRes,
        ListRemindersRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router with every DCR route and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(create_patient))
        .route("/patients/:id", put(update_patient))
        .route(
            "/patients/:id/odontogram",
            get(timeline).post(new_version),
        )
        .route("/patients/:id/odontogram/baseline", get(current_baseline))
        .route("/patients/:id/odontogram/diff", get(diff_versions))
        .route("/patients/:id/odontogram/:version_id", get(read_version))
        .route(
            "/appointments",
            get(list_appointments).post(book_appointment),
        )
        .route("/appointments/:id/cancel", post(cancel_appointment))
        .route("/appointments/:id/reminders", get(list_reminders))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// API TYPES
// ============================================================================

#[derive(serde::Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(serde::Deserialize, ToSchema)]
pub struct AuthorRegistrationReq {
    pub authority: String,
    pub number: String,
}

#[derive(serde::Serialize, ToSchema)]
pub struct PatientRes {
    pub id: String,
    pub given_names: Vec<String>,
    pub family_name: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub created_at: String,
    pub last_updated: Option<String>,
}

impl From<PatientRecord> for PatientRes {
    fn from(record: PatientRecord) -> Self {
        Self {
            id: record.id.to_string(),
            given_names: record.given_names,
            family_name: record.family_name,
            birth_date: record.birth_date,
            phone: record.phone.map(|p| p.as_str().to_owned()),
            created_at: record.created_at.to_rfc3339(),
            last_updated: record.last_updated.map(|t| t.to_rfc3339()),
        }
    }
}

#[derive(serde::Serialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientRes>,
}

#[derive(serde::Deserialize, ToSchema)]
pub struct CreatePatientReq {
    pub author_name: String,
    pub author_role: String,
    pub author_email: String,
    #[serde(default)]
    pub author_registrations: Vec<AuthorRegistrationReq>,
    pub care_location: String,
}

#[derive(serde::Serialize, ToSchema)]
pub struct CreatePatientRes {
    pub patient_id: String,
}

#[derive(serde::Deserialize, ToSchema)]
pub struct UpdatePatientReq {
    pub author_name: String,
    pub author_role: String,
    pub author_email: String,
    #[serde(default)]
    pub author_registrations: Vec<AuthorRegistrationReq>,
    pub care_location: String,
    pub given_names: Vec<String>,
    pub family_name: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(serde::Serialize, ToSchema)]
pub struct UpdatePatientRes {
    pub success: bool,
}

#[derive(serde::Deserialize, ToSchema)]
pub struct NewVersionReq {
    pub author_name: String,
    pub author_role: String,
    pub author_email: String,
    #[serde(default)]
    pub author_registrations: Vec<AuthorRegistrationReq>,
    pub care_location: String,
    /// `diagnostico` or `evolucion`.
    pub kind: String,
    /// Sparse tooth chart: FDI tooth token to condition token (or to an
    /// object with `code` and `surfaces`).
    #[schema(value_type = Object)]
    pub chart: serde_json::Value,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub image_ref: Option<String>,
}

#[derive(serde::Serialize, ToSchema)]
pub struct VersionRes {
    pub id: String,
    pub patient_id: String,
    pub kind: String,
    pub recorded_at: String,
    #[schema(value_type = Object)]
    pub chart: serde_json::Value,
    pub notes: Option<String>,
    pub image_ref: Option<String>,
}

impl VersionRes {
    fn from_version(version: OdontogramVersion) -> Result<Self, RecordError> {
        let chart = serde_json::to_value(&version.chart).map_err(RecordError::Serialization)?;
        Ok(Self {
            id: version.id.to_string(),
            patient_id: version.patient_id.to_string(),
            kind: version.kind.as_str().to_owned(),
            recorded_at: version.recorded_at.to_rfc3339(),
            chart,
            notes: version.notes,
            image_ref: version.image_ref,
        })
    }
}

#[derive(serde::Serialize, ToSchema)]
pub struct TimelineRes {
    pub versions: Vec<VersionRes>,
    pub diagnostico_count: usize,
    pub evolucion_count: usize,
}

#[derive(serde::Deserialize)]
pub struct DiffQuery {
    pub from: String,
    pub to: String,
}

#[derive(serde::Serialize, ToSchema)]
pub struct DiffChangeRes {
    pub tooth: String,
    pub field: String,
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(serde::Serialize, ToSchema)]
pub struct DiffRes {
    pub from: String,
    pub to: String,
    pub changes: Vec<DiffChangeRes>,
}

#[derive(serde::Deserialize, ToSchema)]
pub struct BookAppointmentReq {
    pub author_name: String,
    pub author_role: String,
    pub author_email: String,
    #[serde(default)]
    pub author_registrations: Vec<AuthorRegistrationReq>,
    pub care_location: String,
    pub patient_id: String,
    /// RFC 3339 timestamp of the appointment start.
    pub starts_at: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(serde::Serialize, ToSchema)]
pub struct AppointmentRes {
    pub id: String,
    pub patient_id: String,
    pub starts_at: String,
    pub reason: Option<String>,
    pub status: String,
    pub created_at: String,
}

impl From<Appointment> for AppointmentRes {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id.to_string(),
            patient_id: appointment.patient_id.to_string(),
            starts_at: appointment.starts_at.to_rfc3339(),
            reason: appointment.reason,
            status: appointment.status.as_str().to_owned(),
            created_at: appointment.created_at.to_rfc3339(),
        }
    }
}

#[derive(serde::Serialize, ToSchema)]
pub struct ListAppointmentsRes {
    pub appointments: Vec<AppointmentRes>,
}

#[derive(serde::Deserialize, ToSchema)]
pub struct CancelAppointmentReq {
    pub author_name: String,
    pub author_role: String,
    pub author_email: String,
    #[serde(default)]
    pub author_registrations: Vec<AuthorRegistrationReq>,
    pub care_location: String,
}

#[derive(serde::Serialize, ToSchema)]
pub struct CancelAppointmentRes {
    pub success: bool,
    pub status: String,
}

#[derive(serde::Serialize, ToSchema)]
pub struct ReminderRes {
    pub appointment_id: String,
    pub kind: String,
    pub phone: String,
    pub sent_at: String,
    pub outcome: String,
    pub detail: Option<String>,
}

impl From<ReminderRecord> for ReminderRes {
    fn from(record: ReminderRecord) -> Self {
        Self {
            appointment_id: record.appointment_id.to_string(),
            kind: record.kind.as_str().to_owned(),
            phone: record.phone.as_str().to_owned(),
            sent_at: record.sent_at.to_rfc3339(),
            outcome: match record.outcome {
                dcr_core::DeliveryOutcome::Sent => "sent".to_owned(),
                dcr_core::DeliveryOutcome::Failed => "failed".to_owned(),
            },
            detail: record.detail,
        }
    }
}

#[derive(serde::Serialize, ToSchema)]
pub struct ListRemindersRes {
    pub reminders: Vec<ReminderRes>,
}

// ============================================================================
// HELPERS
// ============================================================================

type ApiError = (StatusCode, &'static str);

/// Maps a core error onto an HTTP status.
///
/// Invalid input and malformed identifiers are the caller's fault; missing
/// records are 404; everything else is logged and reported as a generic 500.
fn map_error(context: &'static str, e: RecordError) -> ApiError {
    match &e {
        RecordError::InvalidInput(_) | RecordError::Uuid(_) => {
            tracing::warn!("{} rejected: {}", context, e);
            (StatusCode::BAD_REQUEST, "Invalid input")
        }
        RecordError::PatientNotFound(_) => (StatusCode::NOT_FOUND, "Patient not found"),
        RecordError::VersionNotFound(_) => (StatusCode::NOT_FOUND, "Version not found"),
        RecordError::AppointmentNotFound(_) => (StatusCode::NOT_FOUND, "Appointment not found"),
        _ => {
            tracing::error!("{} error: {:?}", context, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

fn build_author(
    name: String,
    role: String,
    email: String,
    registrations: Vec<AuthorRegistrationReq>,
) -> Result<Author, ApiError> {
    let name = NonEmptyText::new(name)
        .map_err(|_| (StatusCode::BAD_REQUEST, "author_name is required"))?;
    let role = NonEmptyText::new(role)
        .map_err(|_| (StatusCode::BAD_REQUEST, "author_role is required"))?;
    let email = NonEmptyText::new(email)
        .map_err(|_| (StatusCode::BAD_REQUEST, "author_email is required"))?;

    let registrations = registrations
        .into_iter()
        .map(|r| AuthorRegistration::new(r.authority, r.number))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_error("author registration", e))?;

    Ok(Author {
        name,
        role,
        email,
        registrations,
    })
}

fn parse_care_location(care_location: String) -> Result<NonEmptyText, ApiError> {
    NonEmptyText::new(care_location)
        .map_err(|_| (StatusCode::BAD_REQUEST, "care_location is required"))
}

fn parse_chart(chart: serde_json::Value) -> Result<ToothChart, ApiError> {
    serde_json::from_value(chart).map_err(|e| {
        tracing::warn!("chart rejected: {}", e);
        (StatusCode::BAD_REQUEST, "Invalid tooth chart")
    })
}

fn parse_starts_at(starts_at: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(starts_at)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| (StatusCode::BAD_REQUEST, "starts_at must be RFC 3339"))
}

// ============================================================================
// HANDLERS
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancer probes.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "DCR REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "List of patients", body = ListPatientsRes)
    )
)]
/// List all patients in the clinic.
#[axum::debug_handler]
async fn list_patients(State(state): State<AppState>) -> Json<ListPatientsRes> {
    let patients = PatientService::new(state.cfg.clone())
        .list_patients()
        .into_iter()
        .map(PatientRes::from)
        .collect();
    Json(ListPatientsRes { patients })
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = CreatePatientRes),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Create a new (empty) patient record; demographics are filled by a
/// subsequent update.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    Json(req): Json<CreatePatientReq>,
) -> Result<(StatusCode, Json<CreatePatientRes>), ApiError> {
    let author = build_author(
        req.author_name,
        req.author_role,
        req.author_email,
        req.author_registrations,
    )?;
    let care_location = parse_care_location(req.care_location)?;

    let service = PatientService::new(state.cfg.clone());
    match service.initialise(author, care_location) {
        Ok(initialised) => Ok((
            StatusCode::CREATED,
            Json(CreatePatientRes {
                patient_id: initialised.patient_id().to_string(),
            }),
        )),
        Err(e) => Err(map_error("create patient", e)),
    }
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    request_body = UpdatePatientReq,
    responses(
        (status = 200, description = "Patient updated", body = UpdatePatientRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Update a patient's demographics.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<UpdatePatientReq>,
) -> Result<Json<UpdatePatientRes>, ApiError> {
    let author = build_author(
        req.author_name,
        req.author_role,
        req.author_email,
        req.author_registrations,
    )?;
    let care_location = parse_care_location(req.care_location)?;

    let phone = match req.phone {
        Some(p) if !p.trim().is_empty() => Some(
            PhoneNumber::parse(&p)
                .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid phone number"))?,
        ),
        _ => None,
    };

    let service =
        PatientService::with_id(state.cfg.clone(), &id).map_err(|e| map_error("update patient", e))?;
    service
        .update(
            &author,
            care_location,
            req.given_names,
            &req.family_name,
            req.birth_date,
            phone,
        )
        .map_err(|e| map_error("update patient", e))?;

    Ok(Json(UpdatePatientRes { success: true }))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/odontogram",
    request_body = NewVersionReq,
    responses(
        (status = 201, description = "Odontogram version recorded", body = VersionRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Record a new immutable odontogram version for a patient.
#[axum::debug_handler]
async fn new_version(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<NewVersionReq>,
) -> Result<(StatusCode, Json<VersionRes>), ApiError> {
    let author = build_author(
        req.author_name,
        req.author_role,
        req.author_email,
        req.author_registrations,
    )?;
    let care_location = parse_care_location(req.care_location)?;

    let kind: VersionKind = req
        .kind
        .parse()
        .map_err(|e| map_error("new version", e))?;
    let chart = parse_chart(req.chart)?;

    let service = OdontogramService::for_patient(state.cfg.clone(), &id)
        .map_err(|e| map_error("new version", e))?;
    let version = service
        .create_version(&author, care_location, kind, chart, req.notes, req.image_ref)
        .map_err(|e| map_error("new version", e))?;

    let res = VersionRes::from_version(version).map_err(|e| map_error("new version", e))?;
    Ok((StatusCode::CREATED, Json(res)))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/odontogram",
    responses(
        (status = 200, description = "Version timeline, newest first", body = TimelineRes),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// The patient's odontogram timeline with kind counts.
#[axum::debug_handler]
async fn timeline(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<TimelineRes>, ApiError> {
    let service = OdontogramService::for_patient(state.cfg.clone(), &id)
        .map_err(|e| map_error("timeline", e))?;
    let timeline = service.timeline().map_err(|e| map_error("timeline", e))?;

    let versions = timeline
        .versions
        .into_iter()
        .map(VersionRes::from_version)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_error("timeline", e))?;

    Ok(Json(TimelineRes {
        versions,
        diagnostico_count: timeline.diagnostico_count,
        evolucion_count: timeline.evolucion_count,
    }))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/odontogram/baseline",
    responses(
        (status = 200, description = "Most recent version", body = VersionRes),
        (status = 404, description = "Patient not found or no versions yet"),
        (status = 500, description = "Internal server error")
    )
)]
/// The most recent version: the seed chart for a new follow-up entry.
#[axum::debug_handler]
async fn current_baseline(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<VersionRes>, ApiError> {
    let service = OdontogramService::for_patient(state.cfg.clone(), &id)
        .map_err(|e| map_error("baseline", e))?;
    let baseline = service
        .current_baseline()
        .map_err(|e| map_error("baseline", e))?
        .ok_or((StatusCode::NOT_FOUND, "No versions recorded yet"))?;

    let res = VersionRes::from_version(baseline).map_err(|e| map_error("baseline", e))?;
    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/odontogram/{version_id}",
    responses(
        (status = 200, description = "One version", body = VersionRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Patient or version not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Read one odontogram version by id.
#[axum::debug_handler]
async fn read_version(
    State(state): State<AppState>,
    AxumPath((id, version_id)): AxumPath<(String, String)>,
) -> Result<Json<VersionRes>, ApiError> {
    let service = OdontogramService::for_patient(state.cfg.clone(), &id)
        .map_err(|e| map_error("read version", e))?;
    let version = service
        .version(&version_id)
        .map_err(|e| map_error("read version", e))?;

    let res = VersionRes::from_version(version).map_err(|e| map_error("read version", e))?;
    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/odontogram/diff",
    params(
        ("from" = String, Query, description = "Version id of the left side"),
        ("to" = String, Query, description = "Version id of the right side")
    ),
    responses(
        (status = 200, description = "Per-tooth changes between two versions", body = DiffRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Patient or version not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Compare any two stored versions of a patient's odontogram.
///
/// The comparison is computed on demand and never persisted; either direction
/// is valid.
#[axum::debug_handler]
async fn diff_versions(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Query(query): Query<DiffQuery>,
) -> Result<Json<DiffRes>, ApiError> {
    let service = OdontogramService::for_patient(state.cfg.clone(), &id)
        .map_err(|e| map_error("diff", e))?;

    let from = service
        .version(&query.from)
        .map_err(|e| map_error("diff", e))?;
    let to = service
        .version(&query.to)
        .map_err(|e| map_error("diff", e))?;

    let changes = diff_charts(&from.chart, &to.chart)
        .into_iter()
        .map(|c| DiffChangeRes {
            tooth: c.tooth.code().to_owned(),
            field: c.field,
            from: c.from,
            to: c.to,
        })
        .collect();

    Ok(Json(DiffRes {
        from: from.id.to_string(),
        to: to.id.to_string(),
        changes,
    }))
}

#[utoipa::path(
    post,
    path = "/appointments",
    request_body = BookAppointmentReq,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Patient not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Book an appointment for an existing patient.
#[axum::debug_handler]
async fn book_appointment(
    State(state): State<AppState>,
    Json(req): Json<BookAppointmentReq>,
) -> Result<(StatusCode, Json<AppointmentRes>), ApiError> {
    let author = build_author(
        req.author_name,
        req.author_role,
        req.author_email,
        req.author_registrations,
    )?;
    let care_location = parse_care_location(req.care_location)?;
    let starts_at = parse_starts_at(&req.starts_at)?;

    let patient_id = dcr_core::ShardedUuid::parse(&req.patient_id)
        .map_err(|e| map_error("book appointment", RecordError::Uuid(e)))?;

    let service = AppointmentService::new(state.cfg.clone());
    let appointment = service
        .book(&author, care_location, &patient_id, starts_at, req.reason)
        .map_err(|e| map_error("book appointment", e))?;

    Ok((StatusCode::CREATED, Json(appointment.into())))
}

#[utoipa::path(
    get,
    path = "/appointments",
    responses(
        (status = 200, description = "All appointments", body = ListAppointmentsRes)
    )
)]
/// List every appointment in the book.
#[axum::debug_handler]
async fn list_appointments(State(state): State<AppState>) -> Json<ListAppointmentsRes> {
    let mut appointments = AppointmentService::new(state.cfg.clone()).list_all();
    appointments.sort_by_key(|a| a.starts_at);
    Json(ListAppointmentsRes {
        appointments: appointments.into_iter().map(AppointmentRes::from).collect(),
    })
}

#[utoipa::path(
    post,
    path = "/appointments/{id}/cancel",
    request_body = CancelAppointmentReq,
    responses(
        (status = 200, description = "Appointment cancelled", body = CancelAppointmentRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Appointment not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Cancel a scheduled appointment.
#[axum::debug_handler]
async fn cancel_appointment(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<CancelAppointmentReq>,
) -> Result<Json<CancelAppointmentRes>, ApiError> {
    let author = build_author(
        req.author_name,
        req.author_role,
        req.author_email,
        req.author_registrations,
    )?;
    let care_location = parse_care_location(req.care_location)?;

    let service = AppointmentService::new(state.cfg.clone());
    let appointment = service
        .cancel(&author, care_location, &id)
        .map_err(|e| map_error("cancel appointment", e))?;

    Ok(Json(CancelAppointmentRes {
        success: true,
        status: appointment.status.as_str().to_owned(),
    }))
}

#[utoipa::path(
    get,
    path = "/appointments/{id}/reminders",
    responses(
        (status = 200, description = "Logged reminder deliveries", body = ListRemindersRes),
        (status = 400, description = "Bad request")
    )
)]
/// Logged reminder deliveries for one appointment.
#[axum::debug_handler]
async fn list_reminders(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ListRemindersRes>, ApiError> {
    let appointment_id = dcr_core::ShardedUuid::parse(&id)
        .map_err(|e| map_error("list reminders", RecordError::Uuid(e)))?;

    let reminders = AppointmentService::new(state.cfg.clone())
        .reminders_for(&appointment_id)
        .into_iter()
        .map(ReminderRes::from)
        .collect();

    Ok(Json(ListRemindersRes { reminders }))
}
