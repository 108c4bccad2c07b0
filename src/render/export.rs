// src/render/export.rs

//! Structured JSON export of a schedule.

use crate::error::Result;
use crate::models::Schedule;

/// Pretty JSON keyed by room id, rooms in schedule order.
pub fn to_json(schedule: &Schedule) -> Result<String> {
    Ok(serde_json::to_string_pretty(schedule)?)
}

/// Load a schedule previously written by [`to_json`].
///
/// Accepts text or raw file bytes; bytes that are not valid UTF-8 are an
/// error rather than being replaced.
pub fn from_json(json: impl AsRef<[u8]>) -> Result<Schedule> {
    Ok(serde_json::from_slice(json.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RoomSchedule, TimeSlot};

    fn sample() -> Schedule {
        let mut room = RoomSchedule::new("001");
        room.advisors = "ORFE Advisors: Dr. Smith".into();
        room.graders = "PhD Candidate Graders: A. Lee".into();
        room.schedule = vec![
            TimeSlot::new("10:00 am – 10:20 am", "Jane Doe"),
            TimeSlot::new("10:20 am – 10:40 am", "John Roe"),
        ];
        [room].into_iter().collect()
    }

    #[test]
    fn test_to_json_shape() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "001": {
                    "advisors": "ORFE Advisors: Dr. Smith",
                    "graders": "PhD Candidate Graders: A. Lee",
                    "schedule": [
                        ["10:00 am – 10:20 am", "Jane Doe"],
                        ["10:20 am – 10:40 am", "John Roe"]
                    ]
                }
            })
        );
        // Two-space indentation.
        assert!(json.starts_with("{\n  \"001\": {\n    \"advisors\""));
    }

    #[test]
    fn test_round_trip_keeps_room_order() {
        let schedule: Schedule = ["110", "003", "001", "105A"]
            .into_iter()
            .map(RoomSchedule::new)
            .chain(sample().rooms().cloned())
            .collect();

        let loaded = from_json(&to_json(&schedule).unwrap()).unwrap();
        assert_eq!(loaded, schedule);
        assert_eq!(
            loaded.room_ids().collect::<Vec<_>>(),
            vec!["110", "003", "001", "105A"]
        );
        assert_eq!(loaded.get("001").map(|r| r.room_id.as_str()), Some("001"));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(from_json("[1, 2, 3]").is_err());
        assert!(from_json("{\"001\": {\"schedule\": [[\"10:00 am\"]]}}").is_err());
        assert!(matches!(
            from_json(b"{\"001\": {\"advisors\": \"M\xfcller\"}}"),
            Err(crate::error::AppError::Json(_))
        ));
    }
}
