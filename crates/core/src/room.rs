//! Rooms and beds.

use crate::labels::text_enum;
use crate::occupancy::{room_status, RoomStatus};
use serde::{Deserialize, Serialize};
use ward_types::{BedId, FloorId, IdError, PatientId, RoomId};

text_enum! {
    pub enum RoomType ("room type") {
        Emergency => "emergency",
        Pharmacy => "pharmacy",
        Reception => "reception",
        Private => "private",
        SemiPrivate => "semi-private",
        Ward => "ward",
        Icu => "icu",
        OperatingRoom => "operating-room",
        Recovery => "recovery",
        Pediatric => "pediatric",
        Maternity => "maternity",
        Nicu => "nicu",
    }
}

text_enum! {
    /// Operational flag set by staff, independent of occupancy.
    pub enum RoomCondition ("room condition") {
        InService => "in-service",
        Maintenance => "maintenance",
        Cleaning => "cleaning",
    }
}

impl Default for RoomCondition {
    fn default() -> Self {
        Self::InService
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bed {
    pub id: BedId,
    occupant: Option<PatientId>,
}

impl Bed {
    pub fn occupant(&self) -> Option<&PatientId> {
        self.occupant.as_ref()
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    pub(crate) fn set_occupant(&mut self, occupant: Option<PatientId>) {
        self.occupant = occupant;
    }
}

/// A room and its beds. Beds are numbered `1..=capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub id: RoomId,
    #[serde(rename = "type")]
    pub kind: RoomType,
    pub department: String,
    pub floor: FloorId,
    pub condition: RoomCondition,
    beds: Vec<Bed>,
}

impl Room {
    /// Creates an empty, in-service room with `capacity` beds.
    ///
    /// # Errors
    ///
    /// Returns an [`IdError`] if a bed identifier derived from `id` would be too long.
    pub fn new(
        id: RoomId,
        kind: RoomType,
        department: impl Into<String>,
        floor: FloorId,
        capacity: u16,
    ) -> Result<Self, IdError> {
        let beds = (1..=capacity)
            .map(|seq| {
                BedId::new(id.clone(), seq).map(|id| Bed { id, occupant: None })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            id,
            kind,
            department: department.into(),
            floor,
            condition: RoomCondition::InService,
            beds,
        })
    }

    pub fn with_condition(mut self, condition: RoomCondition) -> Self {
        self.condition = condition;
        self
    }

    pub fn capacity(&self) -> usize {
        self.beds.len()
    }

    pub fn beds(&self) -> &[Bed] {
        &self.beds
    }

    pub fn bed(&self, id: &BedId) -> Option<&Bed> {
        if id.room() != &self.id {
            return None;
        }
        self.beds.get(usize::from(id.sequence()).checked_sub(1)?)
    }

    pub(crate) fn bed_mut(&mut self, id: &BedId) -> Option<&mut Bed> {
        if id.room() != &self.id {
            return None;
        }
        self.beds.get_mut(usize::from(id.sequence()).checked_sub(1)?)
    }

    pub fn occupants(&self) -> impl Iterator<Item = &PatientId> {
        self.beds.iter().filter_map(Bed::occupant)
    }

    pub fn occupant_count(&self) -> usize {
        self.occupants().count()
    }

    /// Lowest-numbered free bed.
    pub fn first_free_bed(&self) -> Option<&Bed> {
        self.beds.iter().find(|b| b.is_free())
    }

    pub fn status(&self) -> RoomStatus {
        room_status(self.condition, self.occupant_count(), self.capacity())
    }

    /// Room search box semantics: id, type, department (case-insensitive substring).
    /// Occupant names are matched by the directory, which owns the patient records.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        needle.is_empty()
            || self.id.as_str().to_lowercase().contains(&needle)
            || self.kind.as_str().contains(&needle)
            || self.department.to_lowercase().contains(&needle)
    }
}
