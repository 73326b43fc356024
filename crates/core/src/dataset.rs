//! YAML dataset and snapshot format.
//!
//! A dataset describes a whole ward: hospital name, floors, staff, rooms, patients and
//! (optionally) the audit trail. The same format is used for the bundled seed and for state
//! files written by the CLI, so a snapshot can be loaded back as a dataset.
//!
//! Occupancy is carried by each patient's `bed` field. Rooms list capacity only; their beds are
//! rebuilt and occupied as patients are loaded.

use crate::constants::{BUNDLED_DATASET, DEFAULT_HOSPITAL_NAME};
use crate::directory::{Directory, Floor, Staff};
use crate::events::WardEvent;
use crate::patient::Patient;
use crate::room::{Room, RoomCondition, RoomType};
use crate::{Ward, WardError, WardResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use ward_types::{BedId, FloorId, RoomId};
use ward_uuid::TimestampId;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DatasetWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hospital: Option<String>,
    #[serde(default)]
    floors: Vec<Floor>,
    #[serde(default)]
    staff: Vec<Staff>,
    #[serde(default)]
    rooms: Vec<RoomWire>,
    #[serde(default)]
    patients: Vec<Patient>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    events: Vec<WardEvent>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RoomWire {
    id: RoomId,
    #[serde(rename = "type")]
    kind: RoomType,
    department: String,
    floor: FloorId,
    capacity: u16,
    #[serde(default, skip_serializing_if = "is_in_service")]
    condition: RoomCondition,
}

fn is_in_service(condition: &RoomCondition) -> bool {
    *condition == RoomCondition::InService
}

/// Parses a dataset from YAML text and validates it.
///
/// # Errors
///
/// Returns `WardError::Dataset` if the text does not match the schema (the message names the
/// failing path) or if the records break an occupancy invariant.
pub fn parse(yaml_text: &str) -> WardResult<Ward> {
    let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
    let wire = match serde_path_to_error::deserialize::<_, DatasetWire>(deserializer) {
        Ok(parsed) => parsed,
        Err(err) => {
            let path = err.path().to_string();
            let source = err.into_inner();
            let path = if path.is_empty() {
                "<root>"
            } else {
                path.as_str()
            };
            return Err(WardError::Dataset(format!(
                "schema mismatch at {path}: {source}"
            )));
        }
    };
    wire_to_ward(wire)
}

fn wire_to_ward(wire: DatasetWire) -> WardResult<Ward> {
    let context = |what: String| move |err: WardError| WardError::Dataset(format!("{what}: {err}"));

    let hospital = wire
        .hospital
        .unwrap_or_else(|| DEFAULT_HOSPITAL_NAME.to_owned());
    let mut dir = Directory::new(hospital);
    for floor in wire.floors {
        let what = format!("floor {}", floor.id);
        dir.add_floor(floor).map_err(context(what))?;
    }
    for member in wire.staff {
        let what = format!("staff {}", member.id);
        dir.add_staff(member).map_err(context(what))?;
    }
    for room in wire.rooms {
        let what = format!("room {}", room.id);
        let built = Room::new(room.id, room.kind, room.department, room.floor, room.capacity)
            .map_err(WardError::from)
            .map_err(context(what.clone()))?
            .with_condition(room.condition);
        dir.add_room(built).map_err(context(what))?;
    }
    for patient in wire.patients {
        let what = format!("patient {}", patient.id);
        dir.add_patient(patient).map_err(context(what))?;
    }
    dir.check_invariants()?;
    check_event_references(&dir, &wire.events)?;

    tracing::info!(
        hospital = dir.hospital_name(),
        rooms = dir.list_rooms(None).len(),
        events = wire.events.len(),
        "dataset loaded"
    );
    Ok(Ward::with_history(dir, wire.events))
}

/// Every patient, bed and room an event names must exist, and a transfer completion must follow
/// the transfer it confirms.
fn check_event_references(dir: &Directory, events: &[WardEvent]) -> WardResult<()> {
    let dangling = |event: &WardEvent, err: WardError| {
        WardError::Dataset(format!("event {}: {err}", event.id()))
    };
    let mut transfers: HashSet<&TimestampId> = HashSet::new();
    for event in events {
        if let Some(patient) = event.patient() {
            dir.get_patient(patient).map_err(|e| dangling(event, e))?;
        }
        let beds: Vec<&BedId> = match event {
            WardEvent::Assigned(r) => vec![&r.to.bed],
            WardEvent::Transferred(r) => vec![&r.from.bed, &r.to.bed],
            WardEvent::Discharged(r) => r.from.iter().map(|l| &l.bed).collect(),
            _ => Vec::new(),
        };
        for bed in beds {
            dir.get_bed(bed).map_err(|e| dangling(event, e))?;
        }
        match event {
            WardEvent::Transferred(r) => {
                transfers.insert(&r.id);
            }
            WardEvent::TransferCompleted(r) if !transfers.contains(&r.transfer) => {
                return Err(WardError::Dataset(format!(
                    "event {}: completes unknown transfer {}",
                    r.id, r.transfer
                )));
            }
            WardEvent::RoomConditionChanged(r) => {
                dir.get_room(&r.room).map_err(|e| dangling(event, e))?;
            }
            _ => {}
        }
    }
    Ok(())
}

/// Renders the ward, including its audit trail, as dataset YAML.
pub fn render(ward: &Ward) -> WardResult<String> {
    let dir = ward.directory();
    let wire = DatasetWire {
        hospital: Some(dir.hospital_name().to_owned()),
        floors: dir.list_floors().to_vec(),
        staff: dir.list_staff(None).into_iter().cloned().collect(),
        rooms: dir
            .list_rooms(None)
            .into_iter()
            .map(|room| RoomWire {
                id: room.id.clone(),
                kind: room.kind,
                department: room.department.clone(),
                floor: room.floor.clone(),
                capacity: u16::try_from(room.capacity()).unwrap_or(u16::MAX),
                condition: room.condition,
            })
            .collect(),
        patients: dir
            .list_patients(&Default::default())
            .into_iter()
            .cloned()
            .collect(),
        events: ward.audit().to_vec(),
    };
    serde_yaml::to_string(&wire).map_err(WardError::YamlSerialization)
}

/// The bundled demo dataset.
pub fn bundled() -> WardResult<Ward> {
    parse(BUNDLED_DATASET)
}

pub fn load_file(path: &Path) -> WardResult<Ward> {
    let text = std::fs::read_to_string(path).map_err(WardError::FileRead)?;
    tracing::debug!(path = %path.display(), "reading dataset");
    parse(&text)
}

pub fn save_file(ward: &Ward, path: &Path) -> WardResult<()> {
    let text = render(ward)?;
    std::fs::write(path, text).map_err(WardError::FileWrite)?;
    tracing::info!(path = %path.display(), "ward state saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::occupancy::RoomStatus;
    use crate::operations::discharge::DischargeChecklist;
    use crate::testing::{
        assign_request, bed, discharge_request, fixture_ward, pid, room_id, staff,
        transfer_request,
    };
    use ward_uuid::TimestampIdGenerator;

    const ONE_ROOM: &str = r#"
floors:
  - id: first
    name: First Floor
rooms:
  - id: A-201
    type: private
    department: General Medicine
    floor: first
    capacity: 1
"#;

    fn with_history(ward: &Ward, keep: impl Fn(&WardEvent) -> bool) -> String {
        let events = ward.audit().iter().filter(|e| keep(*e)).cloned().collect();
        render(&Ward::with_history(ward.directory().clone(), events)).unwrap()
    }

    #[test]
    fn bundled_seed_is_consistent() {
        let ward = bundled().unwrap();
        let dir = ward.directory();
        dir.check_invariants().unwrap();
        assert_eq!(dir.hospital_name(), DEFAULT_HOSPITAL_NAME);
        assert!(!dir.list_floors().is_empty());
        assert!(!dir.active_admissions(None).is_empty());
        for room in dir.list_rooms(None) {
            assert!(room.occupant_count() <= room.capacity());
        }
    }

    #[test]
    fn snapshot_round_trip_preserves_occupancy_and_history() {
        let mut ward = fixture_ward();
        ward.assign(assign_request("P099", "A-201-1")).unwrap();
        ward.transfer(transfer_request("P001", "A-202")).unwrap();
        let checklist = DischargeChecklist::all_required().complete().unwrap();
        ward.discharge(discharge_request("P099", checklist)).unwrap();

        let yaml = render(&ward).unwrap();
        let reloaded = parse(&yaml).unwrap();
        let dir = reloaded.directory();

        assert_eq!(dir.get_bed(&bed("A-202-2")).unwrap().occupant(), Some(&pid("P001")));
        assert!(dir.get_bed(&bed("A-201-1")).unwrap().is_free());
        assert_eq!(
            dir.get_room(&room_id("ICU-1")).unwrap().status(),
            RoomStatus::Maintenance
        );
        assert_eq!(reloaded.audit(), ward.audit());
    }

    #[test]
    fn schema_errors_name_the_path() {
        let yaml = "floors:\n  - id: ground\n    name: Ground\n    colour: blue\n";
        let err = parse(yaml).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("floors"), "{msg}");
        assert!(msg.contains("colour"), "{msg}");
    }

    #[test]
    fn shared_bed_is_rejected() {
        let yaml = r#"
floors:
  - id: first
    name: First Floor
rooms:
  - id: A-201
    type: private
    department: General Medicine
    floor: first
    capacity: 1
patients:
  - id: P001
    name: John Doe
    age: 45
    gender: male
    status: admitted
    bed: A-201-1
  - id: P002
    name: Jane Smith
    age: 32
    gender: female
    status: admitted
    bed: A-201-1
"#;
        let err = parse(yaml).unwrap_err();
        assert!(matches!(err, WardError::Dataset(ref msg) if msg.contains("P002")));
    }

    #[test]
    fn bed_beyond_capacity_is_rejected() {
        let yaml = r#"
floors:
  - id: first
    name: First Floor
rooms:
  - id: A-201
    type: private
    department: General Medicine
    floor: first
    capacity: 1
patients:
  - id: P001
    name: John Doe
    age: 45
    gender: male
    status: admitted
    bed: A-201-2
"#;
        assert!(matches!(parse(yaml), Err(WardError::Dataset(_))));
    }

    #[test]
    fn outpatient_holding_a_bed_is_rejected() {
        let yaml = format!(
            r#"{ONE_ROOM}patients:
  - id: P002
    name: Jane Smith
    age: 32
    gender: female
    status: outpatient
    bed: A-201-1
"#
        );
        let err = parse(&yaml).unwrap_err();
        assert!(matches!(err, WardError::Dataset(ref msg) if msg.contains("outpatient")), "{err}");
    }

    #[test]
    fn discharged_patient_holding_a_bed_is_rejected() {
        let yaml = format!(
            r#"{ONE_ROOM}patients:
  - id: P004
    name: Sarah Wilson
    age: 67
    gender: female
    status: discharged
    bed: A-201-1
"#
        );
        let err = parse(&yaml).unwrap_err();
        assert!(matches!(err, WardError::Dataset(ref msg) if msg.contains("discharged")), "{err}");
    }

    #[test]
    fn admitted_patient_without_a_bed_is_rejected() {
        let yaml = format!(
            r#"{ONE_ROOM}patients:
  - id: P001
    name: John Doe
    age: 45
    gender: male
    status: admitted
"#
        );
        let err = parse(&yaml).unwrap_err();
        assert!(matches!(err, WardError::Dataset(ref msg) if msg.contains("no bed")), "{err}");
    }

    #[test]
    fn completion_of_unknown_transfer_is_rejected() {
        let mut ward = fixture_ward();
        let moved = ward.transfer(transfer_request("P001", "A-201")).unwrap();
        ward.complete_transfer(&moved.id, &staff("N001")).unwrap();

        let yaml = with_history(&ward, |e| !matches!(e, WardEvent::Transferred(_)));
        let err = parse(&yaml).unwrap_err();
        assert!(
            matches!(err, WardError::Dataset(ref msg) if msg.contains("unknown transfer")),
            "{err}"
        );
    }

    #[test]
    fn event_for_unknown_patient_is_rejected() {
        let mut ward = fixture_ward();
        ward.assign(assign_request("P099", "A-201-1")).unwrap();
        let mut events = ward.audit().to_vec();
        if let WardEvent::Assigned(record) = &mut events[0] {
            record.patient = pid("P404");
        }

        let yaml = render(&Ward::with_history(ward.directory().clone(), events)).unwrap();
        let err = parse(&yaml).unwrap_err();
        assert!(matches!(err, WardError::Dataset(ref msg) if msg.contains("P404")), "{err}");
    }

    #[test]
    fn new_events_sort_after_loaded_history() {
        let ward = fixture_ward();
        let future = chrono::Utc::now() + chrono::Duration::days(365);
        let change = WardEvent::RoomConditionChanged(crate::events::RoomConditionChange {
            id: TimestampIdGenerator::new().next_at(future),
            room: room_id("A-201"),
            from: RoomCondition::Cleaning,
            to: RoomCondition::InService,
            actor: staff("N001"),
        });
        let yaml = render(&Ward::with_history(ward.directory().clone(), vec![change])).unwrap();

        let mut reloaded = parse(&yaml).unwrap();
        reloaded
            .set_room_condition(&room_id("A-201"), RoomCondition::Cleaning, &staff("N001"))
            .unwrap();
        let audit = reloaded.audit();
        assert_eq!(audit.len(), 2);
        assert!(audit[1].id() > audit[0].id());
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ward.yaml");
        let ward = fixture_ward();

        save_file(&ward, &path).unwrap();
        let loaded = load_file(&path).unwrap();
        assert_eq!(loaded.directory().hospital_name(), "Test Hospital");
        assert_eq!(loaded.directory().list_rooms(None).len(), 4);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, WardError::FileRead(_)));
    }
}
