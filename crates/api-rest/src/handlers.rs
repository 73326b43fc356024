//! Endpoint handlers.
//!
//! Every handler takes the shared ward lock exactly once, so a request observes and mutates a
//! consistent ward.

use crate::dto::{
    parse, parse_opt, AssignReq, AuditQuery, CensusQuery, CompleteTransferReq, DischargeReq,
    HealthRes, PatientsQuery, RecordVitalsReq, RegisterPatientReq, RoomConditionReq, RoomsQuery,
    SearchQuery, StaffQuery, TransferReq, UpdatePatientReq,
};
use crate::error::{ApiError, ErrorRes};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use ward_core::events::{
    AssignmentRecord, DischargeRecord, RoomConditionChange, TransferCompletion, TransferRecord,
    TransferStatus,
};
use ward_core::operations::vitals::VitalsObservation;
use ward_core::{
    Census, Floor, FloorId, Patient, PatientFilter, PatientId, RoomId, RoomSummary, Staff,
    TimestampId, WardEvent,
};

type ApiResult<T> = Result<Json<T>, ApiError>;
type Created<T> = Result<(StatusCode, Json<T>), ApiError>;

/// A transfer together with its current confirmation status.
#[derive(Debug, Serialize)]
pub struct TransferRes {
    pub transfer: TransferRecord,
    pub status: TransferStatus,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint, used for monitoring and load balancer checks.
pub async fn health(State(state): State<AppState>) -> ApiResult<HealthRes> {
    let hospital = state
        .ward
        .read(|ward| ward.directory().hospital_name().to_owned())?;
    Ok(Json(HealthRes {
        ok: true,
        message: format!("{hospital} ward API is alive"),
    }))
}

#[utoipa::path(
    get,
    path = "/floors",
    responses((status = 200, description = "Floors in display order"))
)]
pub async fn list_floors(State(state): State<AppState>) -> ApiResult<Vec<Floor>> {
    let floors = state
        .ward
        .read(|ward| ward.directory().list_floors().to_vec())?;
    Ok(Json(floors))
}

#[utoipa::path(
    get,
    path = "/staff",
    params(StaffQuery),
    responses(
        (status = 200, description = "Staff members, optionally filtered by role"),
        (status = 422, description = "Unknown role", body = ErrorRes)
    )
)]
pub async fn list_staff(
    State(state): State<AppState>,
    Query(query): Query<StaffQuery>,
) -> ApiResult<Vec<Staff>> {
    let role = parse_opt(query.role.as_deref())?;
    let staff: Vec<Staff> = state.ward.read(|ward| {
        ward.directory()
            .list_staff(role)
            .into_iter()
            .cloned()
            .collect()
    })?;
    Ok(Json(staff))
}

#[utoipa::path(
    get,
    path = "/rooms",
    params(RoomsQuery),
    responses(
        (status = 200, description = "Rooms with derived status and occupants"),
        (status = 404, description = "Unknown floor", body = ErrorRes)
    )
)]
/// Lists rooms, optionally narrowed to one floor and/or a search term.
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomsQuery>,
) -> ApiResult<Vec<RoomSummary>> {
    let floor: Option<FloorId> = parse_opt(query.floor.as_deref())?;
    let search = query.search.filter(|s| !s.trim().is_empty());
    let rooms: Vec<RoomSummary> = state.ward.read(|ward| {
        let directory = ward.directory();
        if let Some(floor) = &floor {
            directory.get_floor(floor)?;
        }
        let rooms = match &search {
            Some(needle) => directory.search_rooms(floor.as_ref(), needle),
            None => directory.list_rooms(floor.as_ref()),
        };
        Ok::<_, ward_core::WardError>(
            rooms
                .into_iter()
                .map(|room| directory.summarize_room(room))
                .collect(),
        )
    })??;
    Ok(Json(rooms))
}

#[utoipa::path(
    get,
    path = "/rooms/{id}",
    params(("id" = String, Path, description = "Room id, e.g. A-201")),
    responses(
        (status = 200, description = "Room with derived status and occupants"),
        (status = 404, description = "Room not found", body = ErrorRes)
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<RoomSummary> {
    let id: RoomId = parse(&id)?;
    let summary = state.ward.read(|ward| {
        let directory = ward.directory();
        directory
            .get_room(&id)
            .map(|room| directory.summarize_room(room))
    })??;
    Ok(Json(summary))
}

#[utoipa::path(
    put,
    path = "/rooms/{id}/condition",
    params(("id" = String, Path, description = "Room id")),
    request_body = RoomConditionReq,
    responses(
        (status = 200, description = "Condition changed"),
        (status = 404, description = "Room or actor not found", body = ErrorRes),
        (status = 409, description = "Room occupied or already in that condition", body = ErrorRes)
    )
)]
/// Puts a room into or out of service (maintenance, cleaning).
pub async fn set_room_condition(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RoomConditionReq>,
) -> ApiResult<RoomConditionChange> {
    let room: RoomId = parse(&id)?;
    let condition = parse(&req.condition)?;
    let actor = parse(&req.actor)?;
    let change = state
        .ward
        .write(|ward| ward.set_room_condition(&room, condition, &actor))?;
    Ok(Json(change))
}

#[utoipa::path(
    get,
    path = "/census",
    params(CensusQuery),
    responses(
        (status = 200, description = "Room and bed counts by derived status"),
        (status = 404, description = "Unknown floor", body = ErrorRes)
    )
)]
pub async fn census(
    State(state): State<AppState>,
    Query(query): Query<CensusQuery>,
) -> ApiResult<Census> {
    let floor: Option<FloorId> = parse_opt(query.floor.as_deref())?;
    let census = state
        .ward
        .read(|ward| ward.directory().census(floor.as_ref()))??;
    Ok(Json(census))
}

#[utoipa::path(
    get,
    path = "/patients",
    params(PatientsQuery),
    responses(
        (status = 200, description = "Patients matching every given filter"),
        (status = 422, description = "Unknown status", body = ErrorRes)
    )
)]
pub async fn list_patients(
    State(state): State<AppState>,
    Query(query): Query<PatientsQuery>,
) -> ApiResult<Vec<Patient>> {
    let filter = PatientFilter {
        search: query.search,
        status: parse_opt(query.status.as_deref())?,
        department: query.department,
    };
    let patients: Vec<Patient> = state.ward.read(|ward| {
        ward.directory()
            .list_patients(&filter)
            .into_iter()
            .cloned()
            .collect()
    })?;
    Ok(Json(patients))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = RegisterPatientReq,
    responses(
        (status = 201, description = "Patient registered"),
        (status = 422, description = "Invalid patient details", body = ErrorRes)
    )
)]
/// Registers a new patient. The id is issued by the ward.
pub async fn register_patient(
    State(state): State<AppState>,
    Json(req): Json<RegisterPatientReq>,
) -> Created<Patient> {
    let new = req.into_new_patient()?;
    let patient = state.ward.write(|ward| ward.register_patient(new))?;
    Ok((StatusCode::CREATED, Json(patient)))
}

#[utoipa::path(
    get,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id, e.g. P001")),
    responses(
        (status = 200, description = "Patient record"),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Patient> {
    let id: PatientId = parse(&id)?;
    let patient = state
        .ward
        .read(|ward| ward.directory().get_patient(&id).cloned())??;
    Ok(Json(patient))
}

#[utoipa::path(
    put,
    path = "/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    request_body = UpdatePatientReq,
    responses(
        (status = 200, description = "Updated patient record"),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 422, description = "Invalid patient details", body = ErrorRes)
    )
)]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePatientReq>,
) -> ApiResult<Patient> {
    let id: PatientId = parse(&id)?;
    let update = req.into_update()?;
    let patient = state.ward.write(|ward| ward.update_patient(&id, update))?;
    Ok(Json(patient))
}

#[utoipa::path(
    get,
    path = "/admissions",
    params(SearchQuery),
    responses((status = 200, description = "Patients currently holding a bed"))
)]
pub async fn active_admissions(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Vec<Patient>> {
    let patients: Vec<Patient> = state.ward.read(|ward| {
        ward.directory()
            .active_admissions(query.search.as_deref())
            .into_iter()
            .cloned()
            .collect()
    })?;
    Ok(Json(patients))
}

#[utoipa::path(
    post,
    path = "/assignments",
    request_body = AssignReq,
    responses(
        (status = 201, description = "Patient placed in the bed"),
        (status = 404, description = "Patient, room, bed or actor not found", body = ErrorRes),
        (status = 409, description = "Bed occupied, patient already placed or room unavailable", body = ErrorRes)
    )
)]
/// Places an unassigned patient in a free bed.
pub async fn assign(
    State(state): State<AppState>,
    Json(req): Json<AssignReq>,
) -> Created<AssignmentRecord> {
    let request = req.into_request()?;
    let record = state.ward.write(|ward| ward.assign(request))?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    post,
    path = "/transfers",
    request_body = TransferReq,
    responses(
        (status = 201, description = "Patient moved; transfer awaits confirmation"),
        (status = 404, description = "Patient, room, bed or staff not found", body = ErrorRes),
        (status = 409, description = "Patient not placed or destination unavailable", body = ErrorRes)
    )
)]
/// Moves a placed patient to another bed. Without a bed the room's first free bed is taken.
pub async fn transfer(
    State(state): State<AppState>,
    Json(req): Json<TransferReq>,
) -> Created<TransferRes> {
    let request = req.into_request()?;
    let transfer = state.ward.write(|ward| ward.transfer(request))?;
    Ok((
        StatusCode::CREATED,
        Json(TransferRes {
            transfer,
            status: TransferStatus::Pending,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/transfers/{id}",
    params(("id" = String, Path, description = "Transfer event id")),
    responses(
        (status = 200, description = "Transfer and its status"),
        (status = 404, description = "Transfer not found", body = ErrorRes)
    )
)]
pub async fn get_transfer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TransferRes> {
    let id: TimestampId = parse(&id)?;
    let res = state.ward.read(|ward| {
        Ok::<_, ward_core::WardError>(TransferRes {
            transfer: ward.find_transfer(&id)?.clone(),
            status: ward.transfer_status(&id)?,
        })
    })??;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/transfers/{id}/complete",
    params(("id" = String, Path, description = "Transfer event id")),
    request_body = CompleteTransferReq,
    responses(
        (status = 200, description = "Transfer confirmed"),
        (status = 404, description = "Transfer or actor not found", body = ErrorRes),
        (status = 409, description = "Transfer already completed", body = ErrorRes)
    )
)]
pub async fn complete_transfer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CompleteTransferReq>,
) -> ApiResult<TransferCompletion> {
    let transfer: TimestampId = parse(&id)?;
    let actor = parse(&req.actor)?;
    let completion = state
        .ward
        .write(|ward| ward.complete_transfer(&transfer, &actor))?;
    Ok(Json(completion))
}

#[utoipa::path(
    post,
    path = "/discharges",
    request_body = DischargeReq,
    responses(
        (status = 201, description = "Patient discharged and bed released"),
        (status = 404, description = "Patient or physician not found", body = ErrorRes),
        (status = 409, description = "Patient is not admitted", body = ErrorRes),
        (status = 422, description = "Checklist incomplete", body = ErrorRes)
    )
)]
/// Discharges an admitted patient. Every required checklist item must be ticked.
pub async fn discharge(
    State(state): State<AppState>,
    Json(req): Json<DischargeReq>,
) -> Created<DischargeRecord> {
    let request = req.into_request()?;
    let record = state.ward.write(|ward| ward.discharge(request))?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    post,
    path = "/patients/{id}/vitals",
    params(("id" = String, Path, description = "Patient id")),
    request_body = RecordVitalsReq,
    responses(
        (status = 201, description = "Observation recorded, with any out-of-range flags"),
        (status = 404, description = "Patient or recorder not found", body = ErrorRes),
        (status = 422, description = "Invalid or rejected readings", body = ErrorRes)
    )
)]
pub async fn record_vitals(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RecordVitalsReq>,
) -> Created<VitalsObservation> {
    let request = req.into_request(parse(&id)?)?;
    let observation = state.ward.write(|ward| ward.record_vitals(request))?;
    Ok((StatusCode::CREATED, Json(observation)))
}

#[utoipa::path(
    get,
    path = "/patients/{id}/vitals",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Observations, newest first"),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
pub async fn vitals_chart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<VitalsObservation>> {
    let id: PatientId = parse(&id)?;
    let chart = state.ward.read(|ward| {
        ward.chart(&id)
            .map(|obs| obs.into_iter().cloned().collect::<Vec<_>>())
    })??;
    Ok(Json(chart))
}

#[utoipa::path(
    get,
    path = "/audit",
    params(AuditQuery),
    responses(
        (status = 200, description = "Audit events, oldest first"),
        (status = 404, description = "Patient not found", body = ErrorRes)
    )
)]
pub async fn audit(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Vec<WardEvent>> {
    let patient: Option<PatientId> = parse_opt(query.patient.as_deref())?;
    let events: Vec<WardEvent> = state.ward.read(|ward| match &patient {
        Some(patient) => ward
            .patient_history(patient)
            .map(|events| events.into_iter().cloned().collect()),
        None => Ok(ward.audit().to_vec()),
    })??;
    Ok(Json(events))
}
