//! Operator CLI for the DCR dental clinic record system.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use dcr_core::{
    diff_charts, AppointmentService, Author, CoreConfig, NonEmptyText, OdontogramService,
    PatientService, PhoneNumber, ReminderDispatcher, ShardedUuid, ToothChart, TracingSender,
    VersionKind, DEFAULT_CLINIC_DATA_DIR,
};

#[derive(Parser)]
#[command(name = "dcr")]
#[command(about = "DCR dental clinic record system CLI")]
struct Cli {
    /// Clinic data directory (defaults to $CLINIC_DATA_DIR or "clinic_data")
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Clinic name used as the commit care location
    #[arg(long)]
    clinic_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Create a new (empty) patient record
    CreatePatient {
        /// Author name for the commit
        name: String,
        /// Author email for the commit
        email: String,
        /// Author role
        #[arg(long, default_value = "Dentist")]
        role: String,
    },
    /// Update a patient's demographics
    UpdatePatient {
        /// Patient UUID
        patient_uuid: String,
        /// Given names (comma-separated)
        given_names: String,
        /// Family name
        family_name: String,
        /// Author name for the commit
        name: String,
        /// Author email for the commit
        email: String,
        /// Date of birth (YYYY-MM-DD)
        #[arg(long)]
        birth_date: Option<String>,
        /// Phone in international form (e.g. +525512345678)
        #[arg(long)]
        phone: Option<String>,
        /// Author role
        #[arg(long, default_value = "Dentist")]
        role: String,
    },
    /// Record a new odontogram version from a chart JSON file
    NewVersion {
        /// Patient UUID
        patient_uuid: String,
        /// Version kind: diagnostico or evolucion
        kind: String,
        /// Path to the chart JSON file (tooth token -> condition token)
        chart_file: PathBuf,
        /// Author name for the commit
        name: String,
        /// Author email for the commit
        email: String,
        /// Free-text clinical notes
        #[arg(long)]
        notes: Option<String>,
        /// Author role
        #[arg(long, default_value = "Dentist")]
        role: String,
    },
    /// Print a patient's odontogram timeline
    Timeline {
        /// Patient UUID
        patient_uuid: String,
    },
    /// Print the current baseline's findings grouped by condition
    Report {
        /// Patient UUID
        patient_uuid: String,
    },
    /// Compare two odontogram versions
    Diff {
        /// Patient UUID
        patient_uuid: String,
        /// Version id of the left side
        from: String,
        /// Version id of the right side
        to: String,
    },
    /// Book an appointment
    Book {
        /// Patient UUID
        patient_uuid: String,
        /// Appointment start (RFC 3339, e.g. 2026-08-20T15:30:00Z)
        starts_at: String,
        /// Author name for the commit
        name: String,
        /// Author email for the commit
        email: String,
        /// Reason for the visit
        #[arg(long)]
        reason: Option<String>,
        /// Author role
        #[arg(long, default_value = "Receptionist")]
        role: String,
    },
    /// List all appointments
    Appointments,
    /// Cancel an appointment
    Cancel {
        /// Appointment UUID
        appointment_uuid: String,
        /// Author name for the commit
        name: String,
        /// Author email for the commit
        email: String,
        /// Author role
        #[arg(long, default_value = "Receptionist")]
        role: String,
    },
    /// Run one reminder polling pass (messages go to the log, not a gateway)
    PollReminders,
}

fn build_author(name: String, role: String, email: String) -> Result<Author, String> {
    Ok(Author {
        name: NonEmptyText::new(name).map_err(|e| format!("author name: {e}"))?,
        role: NonEmptyText::new(role).map_err(|e| format!("author role: {e}"))?,
        email: NonEmptyText::new(email).map_err(|e| format!("author email: {e}"))?,
        registrations: vec![],
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .or_else(|| std::env::var("CLINIC_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CLINIC_DATA_DIR));
    let clinic_name = cli
        .clinic_name
        .or_else(|| std::env::var("DCR_CLINIC_NAME").ok())
        .unwrap_or_else(|| "DCR Dental Clinic".to_string());
    let clinic_name = NonEmptyText::new(clinic_name)?;

    let cfg = Arc::new(CoreConfig::new(data_dir, clinic_name.clone())?);

    match cli.command {
        Commands::List => {
            let patients = PatientService::new(cfg).list_patients();
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {}, Created: {}",
                        patient.id,
                        patient.display_name(),
                        patient.created_at.to_rfc3339()
                    );
                }
            }
        }
        Commands::CreatePatient { name, email, role } => {
            let author = build_author(name, role, email)?;
            let service = PatientService::new(cfg).initialise(author, clinic_name)?;
            println!("Created patient with UUID: {}", service.patient_id());
        }
        Commands::UpdatePatient {
            patient_uuid,
            given_names,
            family_name,
            name,
            email,
            birth_date,
            phone,
            role,
        } => {
            let author = build_author(name, role, email)?;
            let given_names_vec: Vec<String> = given_names
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            let phone = phone.map(|p| PhoneNumber::parse(&p)).transpose()?;

            let service = PatientService::with_id(cfg, &patient_uuid)?;
            service.update(
                &author,
                clinic_name,
                given_names_vec,
                &family_name,
                birth_date,
                phone,
            )?;
            println!("Updated patient {}", patient_uuid);
        }
        Commands::NewVersion {
            patient_uuid,
            kind,
            chart_file,
            name,
            email,
            notes,
            role,
        } => {
            let author = build_author(name, role, email)?;
            let kind: VersionKind = kind.parse()?;
            let chart_json = std::fs::read_to_string(&chart_file)?;
            let chart: ToothChart = serde_json::from_str(&chart_json)?;

            let service = OdontogramService::for_patient(cfg, &patient_uuid)?;
            let version =
                service.create_version(&author, clinic_name, kind, chart, notes, None)?;
            println!("Recorded {} version: {}", version.kind, version.id);
        }
        Commands::Timeline { patient_uuid } => {
            let service = OdontogramService::for_patient(cfg, &patient_uuid)?;
            let timeline = service.timeline()?;
            println!(
                "{} versions ({} diagnostico, {} evolucion)",
                timeline.versions.len(),
                timeline.diagnostico_count,
                timeline.evolucion_count
            );
            for version in timeline.versions {
                let findings = version.chart.findings().len();
                println!(
                    "  {}  {}  {} findings{}",
                    version.id,
                    version.kind,
                    findings,
                    version
                        .notes
                        .as_deref()
                        .map(|n| format!("  ({n})"))
                        .unwrap_or_default()
                );
            }
        }
        Commands::Report { patient_uuid } => {
            let service = OdontogramService::for_patient(cfg, &patient_uuid)?;
            match service.current_baseline()? {
                None => println!("No versions recorded yet."),
                Some(baseline) => {
                    println!("Baseline {} ({})", baseline.id, baseline.kind);
                    let findings = baseline.chart.findings();
                    if findings.is_empty() {
                        println!("  no findings");
                    } else {
                        for (condition, teeth) in ToothChart::group_by_code(&findings) {
                            let teeth: Vec<&str> = teeth.iter().map(|t| t.code()).collect();
                            println!(
                                "  {} ({}): {}",
                                condition.label(),
                                condition.code(),
                                teeth.join(", ")
                            );
                        }
                    }
                }
            }
        }
        Commands::Diff {
            patient_uuid,
            from,
            to,
        } => {
            let service = OdontogramService::for_patient(cfg, &patient_uuid)?;
            let from = service.version(&from)?;
            let to = service.version(&to)?;

            let changes = diff_charts(&from.chart, &to.chart);
            if changes.is_empty() {
                println!("No changes.");
            } else {
                for change in changes {
                    println!(
                        "  tooth {} {}: {} -> {}",
                        change.tooth,
                        change.field,
                        change.from.as_deref().unwrap_or("null"),
                        change.to.as_deref().unwrap_or("null")
                    );
                }
            }
        }
        Commands::Book {
            patient_uuid,
            starts_at,
            name,
            email,
            reason,
            role,
        } => {
            let author = build_author(name, role, email)?;
            let patient_id = ShardedUuid::parse(&patient_uuid)?;
            let starts_at: DateTime<Utc> =
                DateTime::parse_from_rfc3339(&starts_at)?.with_timezone(&Utc);

            let service = AppointmentService::new(cfg);
            let appointment =
                service.book(&author, clinic_name, &patient_id, starts_at, reason)?;
            println!("Booked appointment {}", appointment.id);
        }
        Commands::Appointments => {
            let mut appointments = AppointmentService::new(cfg).list_all();
            appointments.sort_by_key(|a| a.starts_at);
            if appointments.is_empty() {
                println!("No appointments found.");
            } else {
                for appointment in appointments {
                    println!(
                        "ID: {}, Patient: {}, Starts: {}, Status: {}",
                        appointment.id,
                        appointment.patient_id,
                        appointment.starts_at.to_rfc3339(),
                        appointment.status.as_str()
                    );
                }
            }
        }
        Commands::Cancel {
            appointment_uuid,
            name,
            email,
            role,
        } => {
            let author = build_author(name, role, email)?;
            let service = AppointmentService::new(cfg);
            let appointment = service.cancel(&author, clinic_name, &appointment_uuid)?;
            println!(
                "Appointment {} is now {}",
                appointment.id,
                appointment.status.as_str()
            );
        }
        Commands::PollReminders => {
            let dispatcher = ReminderDispatcher::new(cfg, Arc::new(TracingSender));
            let summary = dispatcher.poll_once(Utc::now())?;
            println!(
                "considered: {}, sent: {}, failed: {}, no phone: {}, already sent: {}",
                summary.considered,
                summary.sent,
                summary.failed,
                summary.skipped_no_phone,
                summary.skipped_already_sent
            );
        }
    }

    Ok(())
}
