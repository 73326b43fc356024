use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ward_core::config::{
    dataset_path_from_env_value, hospital_name_from_env_value, vitals_policy_from_env_value,
};
use ward_core::constants::{DATASET_ENV, HOSPITAL_NAME_ENV, VITALS_POLICY_ENV};
use ward_core::dataset;
use ward_core::events::{
    AssignmentType, DischargeDestination, DischargeType, TransferReason, TransferType,
    TransportType, Urgency,
};
use ward_core::operations::assignment::AssignmentRequest;
use ward_core::operations::discharge::{DischargeChecklist, DischargeRequest};
use ward_core::operations::transfer::TransferRequest;
use ward_core::operations::vitals::{
    BloodPressure, Temperature, TemperatureUnit, VitalsPayload, VitalsRequest,
};
use ward_core::patient::{BloodGroup, Gender, NewPatient, PatientUpdate};
use ward_core::{
    BedId, CoreConfig, FloorId, NonEmptyText, Patient, PatientFilter, PatientId, PatientStatus,
    RoomCondition, RoomId, RoomSummary, StaffId, StaffRole, TimestampId, Ward, WardEvent,
};

mod render;

#[derive(Parser)]
#[command(name = "ward")]
#[command(about = "Hospital room and bed occupancy CLI")]
struct Cli {
    /// Ward state file. Loaded if it exists and written back after every change.
    #[arg(long, global = true)]
    state: Option<PathBuf>,
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List rooms with their derived status
    Rooms {
        /// Floor id (ground, first, ...)
        #[arg(long)]
        floor: Option<FloorId>,
        /// Match room id, type, department or occupant name
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one room and its beds
    Room {
        /// Room id, e.g. A-201
        id: RoomId,
    },
    /// Room and bed counts
    Census {
        #[arg(long)]
        floor: Option<FloorId>,
    },
    /// List floors
    Floors,
    /// List staff
    Staff {
        #[arg(long)]
        role: Option<StaffRole>,
    },
    /// List patients
    Patients {
        #[arg(long)]
        status: Option<PatientStatus>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one patient
    Patient {
        id: PatientId,
    },
    /// List patients currently holding a bed
    Admissions {
        #[arg(long)]
        search: Option<String>,
    },
    /// Register a new patient
    Register {
        name: NonEmptyText,
        age: u16,
        gender: Gender,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        emergency_contact: Option<String>,
        #[arg(long)]
        blood_group: Option<BloodGroup>,
        /// Known allergy (repeatable)
        #[arg(long = "allergy")]
        allergies: Vec<String>,
        /// Known condition (repeatable)
        #[arg(long = "condition")]
        conditions: Vec<String>,
        #[arg(long)]
        department: Option<String>,
        /// Register as an emergency arrival
        #[arg(long)]
        emergency: bool,
    },
    /// Update a patient's details; an empty value clears an optional field
    UpdatePatient {
        id: PatientId,
        #[arg(long)]
        name: Option<NonEmptyText>,
        #[arg(long)]
        age: Option<u16>,
        #[arg(long)]
        gender: Option<Gender>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        emergency_contact: Option<String>,
        #[arg(long)]
        blood_group: Option<BloodGroup>,
        #[arg(long = "add-allergy")]
        add_allergies: Vec<String>,
        #[arg(long = "remove-allergy")]
        remove_allergies: Vec<String>,
        #[arg(long = "add-condition")]
        add_conditions: Vec<String>,
        #[arg(long = "remove-condition")]
        remove_conditions: Vec<String>,
    },
    /// Place a patient in a free bed
    Assign {
        patient: PatientId,
        /// Bed id, e.g. A-201-2
        bed: BedId,
        /// Staff member performing the assignment
        #[arg(long)]
        actor: StaffId,
        #[arg(long = "type", default_value = "admission")]
        assignment_type: AssignmentType,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Move a placed patient to another room
    Transfer {
        patient: PatientId,
        room: RoomId,
        /// Destination bed; defaults to the room's first free bed
        #[arg(long)]
        bed: Option<BedId>,
        #[arg(long)]
        reason: TransferReason,
        #[arg(long = "type", default_value = "internal")]
        transfer_type: TransferType,
        #[arg(long, default_value = "routine")]
        urgency: Urgency,
        #[arg(long)]
        requested_by: StaffId,
        #[arg(long)]
        approved_by: Option<StaffId>,
        /// Receiving department, if different from the room's
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Confirm a pending transfer
    CompleteTransfer {
        /// Transfer event id
        transfer: TimestampId,
        #[arg(long)]
        actor: StaffId,
    },
    /// Discharge an admitted patient
    Discharge {
        patient: PatientId,
        /// Discharging doctor
        #[arg(long)]
        physician: StaffId,
        #[arg(long)]
        diagnosis: NonEmptyText,
        #[arg(long = "type", default_value = "routine")]
        discharge_type: DischargeType,
        #[arg(long, default_value = "home")]
        destination: DischargeDestination,
        /// Discharge medication (repeatable)
        #[arg(long = "medication")]
        medications: Vec<String>,
        #[arg(long)]
        follow_up_instructions: Option<String>,
        #[arg(long)]
        follow_up_appointment: Option<String>,
        #[arg(long)]
        transport: Option<TransportType>,
        #[arg(long)]
        notes: Option<String>,
        /// Patient education completed
        #[arg(long)]
        education: bool,
        /// Medication reconciliation completed
        #[arg(long)]
        med_reconciliation: bool,
        /// Discharge summary provided
        #[arg(long)]
        summary: bool,
        /// Follow-up appointment scheduled
        #[arg(long)]
        follow_up_scheduled: bool,
    },
    /// Record vital signs
    Vitals {
        patient: PatientId,
        #[arg(long)]
        recorder: StaffId,
        #[arg(long)]
        temp: Option<f64>,
        #[arg(long, default_value = "F")]
        temp_unit: TemperatureUnit,
        /// Blood pressure as systolic/diastolic
        #[arg(long)]
        bp: Option<BloodPressure>,
        #[arg(long)]
        heart_rate: Option<u16>,
        #[arg(long)]
        resp_rate: Option<u16>,
        #[arg(long)]
        spo2: Option<u8>,
        /// Pain score, 0-10
        #[arg(long)]
        pain: Option<u8>,
        #[arg(long)]
        weight_kg: Option<f64>,
        #[arg(long)]
        height_cm: Option<f64>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show a patient's vitals, newest first
    Chart {
        patient: PatientId,
    },
    /// Show the audit trail
    Audit {
        #[arg(long)]
        patient: Option<PatientId>,
    },
    /// Put a room into or out of service
    RoomCondition {
        room: RoomId,
        condition: RoomCondition,
        #[arg(long)]
        actor: StaffId,
    },
    /// Write the current ward to a YAML dataset file
    Export {
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ward=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("No command given. Use --help for usage.");
        return Ok(());
    };

    let mut ward = load_ward(cli.state.as_deref())?;
    let changed = run(&mut ward, command, cli.json)?;

    if changed {
        match &cli.state {
            Some(path) => dataset::save_file(&ward, path)
                .with_context(|| format!("saving ward state to {}", path.display()))?,
            None => tracing::warn!("change not persisted; pass --state FILE to keep it"),
        }
    }
    Ok(())
}

/// Loads the state file if it exists, otherwise the dataset named by `WARD_DATASET` (or the
/// bundled seed).
fn load_ward(state: Option<&Path>) -> anyhow::Result<Ward> {
    let dataset_path = match state {
        Some(path) if path.exists() => Some(path.to_path_buf()),
        _ => dataset_path_from_env_value(std::env::var(DATASET_ENV).ok()),
    };
    let cfg = CoreConfig::new(
        dataset_path,
        vitals_policy_from_env_value(std::env::var(VITALS_POLICY_ENV).ok())?,
        hospital_name_from_env_value(std::env::var(HOSPITAL_NAME_ENV).ok()),
    )?;
    Ok(cfg.load_ward()?)
}

fn emit<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

/// Runs one command against the ward. Returns whether the ward was changed.
fn run(ward: &mut Ward, command: Commands, json: bool) -> anyhow::Result<bool> {
    match command {
        Commands::Rooms { floor, search } => {
            let directory = ward.directory();
            if let Some(floor) = &floor {
                directory.get_floor(floor)?;
            }
            let rooms = match search.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(needle) => directory.search_rooms(floor.as_ref(), needle),
                None => directory.list_rooms(floor.as_ref()),
            };
            let summaries: Vec<RoomSummary> = rooms
                .into_iter()
                .map(|room| directory.summarize_room(room))
                .collect();
            emit(json, &summaries, |rooms| {
                if rooms.is_empty() {
                    println!("No rooms found.");
                }
                rooms.iter().for_each(render::room_line);
            })?;
        }
        Commands::Room { id } => {
            let directory = ward.directory();
            let summary = directory.summarize_room(directory.get_room(&id)?);
            emit(json, &summary, render::room_details)?;
        }
        Commands::Census { floor } => {
            let census = ward.directory().census(floor.as_ref())?;
            emit(json, &census, render::census)?;
        }
        Commands::Floors => {
            emit(json, ward.directory().list_floors(), |floors| {
                for floor in floors {
                    println!("{:<8} {}", floor.id.as_str(), floor.name);
                }
            })?;
        }
        Commands::Staff { role } => {
            let staff = ward.directory().list_staff(role);
            emit(json, &staff, |staff| {
                for member in staff {
                    println!(
                        "{:<6} {:<28} {:<13} {}",
                        member.id.as_str(),
                        member.name.as_str(),
                        member.role.as_str(),
                        member.department
                    );
                }
            })?;
        }
        Commands::Patients {
            status,
            department,
            search,
        } => {
            let filter = PatientFilter {
                search,
                status,
                department,
            };
            let patients = ward.directory().list_patients(&filter);
            emit(json, &patients, |patients| {
                if patients.is_empty() {
                    println!("No patients found.");
                }
                patients.iter().copied().for_each(render::patient_line);
            })?;
        }
        Commands::Patient { id } => {
            let patient = ward.directory().get_patient(&id)?;
            emit(json, patient, render::patient_details)?;
        }
        Commands::Admissions { search } => {
            let patients = ward.directory().active_admissions(search.as_deref());
            emit(json, &patients, |patients| {
                patients.iter().copied().for_each(render::patient_line);
            })?;
        }
        Commands::Register {
            name,
            age,
            gender,
            phone,
            email,
            address,
            emergency_contact,
            blood_group,
            allergies,
            conditions,
            department,
            emergency,
        } => {
            let patient = ward.register_patient(NewPatient {
                name,
                age,
                gender,
                phone,
                email,
                address,
                emergency_contact,
                blood_group,
                allergies,
                conditions,
                department,
                emergency,
            })?;
            emit(json, &patient, |p: &Patient| {
                println!("Registered patient {} ({})", p.id, p.name);
            })?;
            return Ok(true);
        }
        Commands::UpdatePatient {
            id,
            name,
            age,
            gender,
            phone,
            email,
            address,
            emergency_contact,
            blood_group,
            add_allergies,
            remove_allergies,
            add_conditions,
            remove_conditions,
        } => {
            let before = ward.audit().len();
            let patient = ward.update_patient(
                &id,
                PatientUpdate {
                    name,
                    age,
                    gender,
                    phone,
                    email,
                    address,
                    emergency_contact,
                    blood_group,
                    add_allergies,
                    remove_allergies,
                    add_conditions,
                    remove_conditions,
                },
            )?;
            emit(json, &patient, render::patient_details)?;
            return Ok(ward.audit().len() > before);
        }
        Commands::Assign {
            patient,
            bed,
            actor,
            assignment_type,
            notes,
        } => {
            let record = ward.assign(AssignmentRequest {
                patient,
                room: bed.room().clone(),
                bed,
                assignment_type,
                actor,
                notes,
            })?;
            emit(json, &record, |r| {
                println!("Assigned {} to bed {} ({})", r.patient, r.to.bed, r.to.department);
            })?;
            return Ok(true);
        }
        Commands::Transfer {
            patient,
            room,
            bed,
            reason,
            transfer_type,
            urgency,
            requested_by,
            approved_by,
            department,
            notes,
        } => {
            let record = ward.transfer(TransferRequest {
                patient,
                department,
                room,
                bed,
                reason,
                transfer_type,
                urgency,
                requested_by,
                approved_by,
                notes,
            })?;
            emit(json, &record, |r| {
                println!(
                    "Transferred {} from {} to {}; transfer {} is pending",
                    r.patient, r.from.bed, r.to.bed, r.id
                );
            })?;
            return Ok(true);
        }
        Commands::CompleteTransfer { transfer, actor } => {
            let completion = ward.complete_transfer(&transfer, &actor)?;
            emit(json, &completion, |c| {
                println!("Transfer {} completed by {}", c.transfer, c.actor);
            })?;
            return Ok(true);
        }
        Commands::Discharge {
            patient,
            physician,
            diagnosis,
            discharge_type,
            destination,
            medications,
            follow_up_instructions,
            follow_up_appointment,
            transport,
            notes,
            education,
            med_reconciliation,
            summary,
            follow_up_scheduled,
        } => {
            let checklist = DischargeChecklist {
                patient_education: education,
                medication_reconciliation: med_reconciliation,
                summary_provided: summary,
                follow_up_scheduled,
            }
            .complete()?;
            let record = ward.discharge(DischargeRequest {
                patient,
                discharge_type,
                destination,
                physician,
                final_diagnosis: diagnosis,
                medications,
                follow_up_instructions,
                follow_up_appointment,
                transport,
                notes,
                checklist,
            })?;
            emit(json, &record, |r| match &r.from {
                Some(from) => println!("Discharged {}; bed {} released", r.patient, from.bed),
                None => println!("Discharged {}", r.patient),
            })?;
            return Ok(true);
        }
        Commands::Vitals {
            patient,
            recorder,
            temp,
            temp_unit,
            bp,
            heart_rate,
            resp_rate,
            spo2,
            pain,
            weight_kg,
            height_cm,
            notes,
        } => {
            let payload = VitalsPayload {
                temperature: temp.map(|value| Temperature {
                    value,
                    unit: temp_unit,
                }),
                blood_pressure: bp,
                heart_rate,
                respiratory_rate: resp_rate,
                oxygen_saturation: spo2,
                pain_score: pain,
                weight_kg,
                height_cm,
                notes,
            };
            let observation = ward.record_vitals(VitalsRequest {
                patient,
                recorder,
                payload,
            })?;
            emit(json, &observation, render::observation)?;
            return Ok(true);
        }
        Commands::Chart { patient } => {
            let chart = ward.chart(&patient)?;
            emit(json, &chart, |chart| {
                if chart.is_empty() {
                    println!("No vitals recorded for {patient}.");
                }
                chart.iter().copied().for_each(render::observation);
            })?;
        }
        Commands::Audit { patient } => {
            let events: Vec<&WardEvent> = match &patient {
                Some(patient) => ward.patient_history(patient)?,
                None => ward.audit().iter().collect(),
            };
            emit(json, &events, |events| {
                for event in events {
                    println!(
                        "{}  {:<22} {}",
                        event.at().format("%Y-%m-%d %H:%M:%S"),
                        event.kind(),
                        event.patient().map(|p| p.as_str()).unwrap_or("-")
                    );
                }
            })?;
        }
        Commands::RoomCondition {
            room,
            condition,
            actor,
        } => {
            let change = ward.set_room_condition(&room, condition, &actor)?;
            emit(json, &change, |c| {
                println!("Room {} is now {} (was {})", c.room, c.to, c.from);
            })?;
            return Ok(true);
        }
        Commands::Export { path } => {
            dataset::save_file(ward, &path)
                .with_context(|| format!("exporting ward to {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(false)
}
