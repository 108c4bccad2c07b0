// src/models/schedule.rs

//! Canonical schedule data model.
//!
//! A [`Schedule`] is an insertion-ordered mapping from room id to
//! [`RoomSchedule`]. The serialized form is the export format:
//!
//! ```text
//! { "001": { "advisors": "...", "graders": "...", "schedule": [["9:00 am – 9:15 am", "Name"]] } }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One presentation within a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct TimeSlot {
    /// Human-readable range, e.g. "9:00 am – 9:15 am"
    pub time_range: String,

    /// Presenter full name
    pub presenter: String,
}

impl TimeSlot {
    pub fn new(time_range: impl Into<String>, presenter: impl Into<String>) -> Self {
        Self {
            time_range: time_range.into(),
            presenter: presenter.into(),
        }
    }
}

impl From<(String, String)> for TimeSlot {
    fn from((time_range, presenter): (String, String)) -> Self {
        Self {
            time_range,
            presenter,
        }
    }
}

impl From<TimeSlot> for (String, String) {
    fn from(slot: TimeSlot) -> Self {
        (slot.time_range, slot.presenter)
    }
}

/// Schedule of a single room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSchedule {
    /// Room identifier; carried as the map key in serialized form
    #[serde(skip)]
    pub room_id: String,

    /// Advisor line (empty if the page had none)
    #[serde(default)]
    pub advisors: String,

    /// Grader line (empty if the page had none)
    #[serde(default)]
    pub graders: String,

    /// Presentations in page order
    #[serde(default)]
    pub schedule: Vec<TimeSlot>,
}

impl RoomSchedule {
    /// Create an empty room record.
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            ..Self::default()
        }
    }
}

/// All rooms of a symposium, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    rooms: IndexMap<String, RoomSchedule>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a room keyed by its id.
    ///
    /// Returns `false` and leaves the schedule untouched if the id is
    /// already present; the first occurrence wins.
    pub fn insert(&mut self, room: RoomSchedule) -> bool {
        if self.rooms.contains_key(&room.room_id) {
            return false;
        }
        self.rooms.insert(room.room_id.clone(), room);
        true
    }

    pub fn get(&self, room_id: &str) -> Option<&RoomSchedule> {
        self.rooms.get(room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Rooms in insertion order.
    pub fn rooms(&self) -> impl Iterator<Item = &RoomSchedule> {
        self.rooms.values()
    }

    /// Room ids in insertion order.
    pub fn room_ids(&self) -> impl Iterator<Item = &str> {
        self.rooms.keys().map(String::as_str)
    }

    /// Total number of time slots across all rooms.
    pub fn slot_count(&self) -> usize {
        self.rooms.values().map(|r| r.schedule.len()).sum()
    }
}

impl FromIterator<RoomSchedule> for Schedule {
    fn from_iter<I: IntoIterator<Item = RoomSchedule>>(iter: I) -> Self {
        let mut schedule = Self::new();
        for room in iter {
            schedule.insert(room);
        }
        schedule
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.rooms.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Schedule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let rooms = IndexMap::<String, RoomSchedule>::deserialize(deserializer)?;
        Ok(rooms
            .into_iter()
            .map(|(room_id, room)| RoomSchedule { room_id, ..room })
            .collect())
    }
}
