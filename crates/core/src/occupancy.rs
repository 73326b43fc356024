//! Occupancy ledger.
//!
//! Room status and census figures are pure functions of the current directory contents. Nothing
//! here is stored; every read recomputes.

use crate::directory::Directory;
use crate::labels::text_enum;
use crate::room::{Room, RoomCondition, RoomType};
use crate::WardResult;
use serde::Serialize;
use ward_types::{BedId, FloorId, PatientId, RoomId};

text_enum! {
    pub enum RoomStatus ("room status") {
        Available => "available",
        PartiallyOccupied => "partially-occupied",
        Occupied => "occupied",
        Maintenance => "maintenance",
        Cleaning => "cleaning",
    }
}

/// Derives a room's status.
///
/// The maintenance and cleaning flags win over occupancy. A room with no beds (reception,
/// pharmacy) is always available.
pub fn room_status(condition: RoomCondition, occupants: usize, capacity: usize) -> RoomStatus {
    match condition {
        RoomCondition::Maintenance => RoomStatus::Maintenance,
        RoomCondition::Cleaning => RoomStatus::Cleaning,
        RoomCondition::InService => {
            if capacity == 0 || occupants == 0 {
                RoomStatus::Available
            } else if occupants >= capacity {
                RoomStatus::Occupied
            } else {
                RoomStatus::PartiallyOccupied
            }
        }
    }
}

/// Counts for the statistics cards on the room-management page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Census {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<FloorId>,
    pub rooms: usize,
    pub available: usize,
    pub partially_occupied: usize,
    pub occupied: usize,
    pub maintenance: usize,
    pub cleaning: usize,
    pub beds: usize,
    pub occupied_beds: usize,
    /// Free beds in rooms that are in service.
    pub free_beds: usize,
    /// Occupied beds over total beds, `0.0` when there are no beds.
    pub occupancy_rate: f64,
}

impl Census {
    pub fn from_rooms<'a>(
        floor: Option<FloorId>,
        rooms: impl IntoIterator<Item = &'a Room>,
    ) -> Self {
        let mut census = Census {
            floor,
            ..Census::default()
        };
        for room in rooms {
            census.rooms += 1;
            match room.status() {
                RoomStatus::Available => census.available += 1,
                RoomStatus::PartiallyOccupied => census.partially_occupied += 1,
                RoomStatus::Occupied => census.occupied += 1,
                RoomStatus::Maintenance => census.maintenance += 1,
                RoomStatus::Cleaning => census.cleaning += 1,
            }
            let occupied = room.occupant_count();
            census.beds += room.capacity();
            census.occupied_beds += occupied;
            if room.condition == RoomCondition::InService {
                census.free_beds += room.capacity() - occupied;
            }
        }
        if census.beds > 0 {
            census.occupancy_rate = census.occupied_beds as f64 / census.beds as f64;
        }
        census
    }
}

/// One bed as shown in the room details dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BedView {
    pub bed: BedId,
    pub occupant: Option<PatientId>,
    pub occupant_name: Option<String>,
}

/// A room with its derived status and occupants resolved to names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSummary {
    pub id: RoomId,
    #[serde(rename = "type")]
    pub kind: RoomType,
    pub department: String,
    pub floor: FloorId,
    pub capacity: usize,
    pub condition: RoomCondition,
    pub status: RoomStatus,
    pub beds: Vec<BedView>,
}

impl Directory {
    /// Census over one floor, or the whole hospital when `floor` is `None`.
    ///
    /// # Errors
    ///
    /// Returns `WardError::NotFound` if `floor` names an unknown floor.
    pub fn census(&self, floor: Option<&FloorId>) -> WardResult<Census> {
        if let Some(floor) = floor {
            self.get_floor(floor)?;
        }
        Ok(Census::from_rooms(floor.cloned(), self.list_rooms(floor)))
    }

    /// Whether a room can take a new patient right now.
    pub fn is_available_for_admission(&self, room: &Room) -> bool {
        room.condition == RoomCondition::InService && room.first_free_bed().is_some()
    }

    pub fn summarize_room(&self, room: &Room) -> RoomSummary {
        let beds = room
            .beds()
            .iter()
            .map(|bed| {
                let occupant = bed.occupant().cloned();
                let occupant_name = occupant
                    .as_ref()
                    .and_then(|id| self.get_patient(id).ok())
                    .map(|p| p.name.to_string());
                BedView {
                    bed: bed.id.clone(),
                    occupant,
                    occupant_name,
                }
            })
            .collect();
        RoomSummary {
            id: room.id.clone(),
            kind: room.kind,
            department: room.department.clone(),
            floor: room.floor.clone(),
            capacity: room.capacity(),
            condition: room.condition,
            status: room.status(),
            beds,
        }
    }
}
