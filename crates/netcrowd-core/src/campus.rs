//! Campus catalog: known buildings, their rooms, and the option lists
//! offered on the report form
//!
//! The catalog is advisory. Reports may name any building or room.

use serde::Serialize;

/// A building and the rooms reports can be filed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Building {
    pub name: &'static str,
    pub rooms: &'static [&'static str],
}

const BUILDINGS: &[Building] = &[
    Building {
        name: "D4",
        rooms: &[
            "D4-101", "D4-102", "D4-103", "D4-201", "D4-202", "D4-203", "D4-301", "D4-302",
            "Lab D4-A", "Lab D4-B", "Area Umum D4",
        ],
    },
    Building {
        name: "D3",
        rooms: &[
            "HI-101", "HI-102", "HI-103", "HI-104", "HI-201", "HI-202", "HI-203", "HI-204",
            "HI-301", "HI-302", "Area Umum D3",
        ],
    },
    Building {
        name: "TC",
        rooms: &[
            "TC-101", "TC-102", "TC-103", "TC-201", "TC-202", "TC-203", "Auditorium TC",
            "Lab TC-A", "Lab TC-B", "Area Umum TC",
        ],
    },
    Building {
        name: "SAW",
        rooms: &[
            "SAW-101", "SAW-102", "SAW-103", "SAW-201", "SAW-202", "Cafeteria", "Library",
            "Area Umum SAW",
        ],
    },
    Building {
        name: "Pascasarjana",
        rooms: &[
            "PG-101", "PG-102", "PG-103", "PG-201", "PG-202", "Lab PG-A",
            "Area Umum Pascasarjana",
        ],
    },
    Building {
        name: "Other",
        rooms: &["Parking Area", "Garden Area", "Sports Field", "Other Location"],
    },
];

/// Issue categories offered on the report form
pub const ISSUE_TYPES: &[&str] = &[
    "Slow Internet Speed",
    "No Internet Connection",
    "Intermittent Connection",
    "WiFi Not Working",
    "High Latency/Ping",
    "Other",
];

/// Device kinds offered on the report form
pub const DEVICES: &[&str] = &["Laptop", "Smartphone", "Tablet", "Desktop Computer", "Other"];

pub fn buildings() -> &'static [Building] {
    BUILDINGS
}

/// Rooms of a building, matched case-insensitively
pub fn rooms(building: &str) -> Option<&'static [&'static str]> {
    BUILDINGS
        .iter()
        .find(|b| b.name.eq_ignore_ascii_case(building))
        .map(|b| b.rooms)
}

/// Whether `room` is a catalogued room of `building`
pub fn is_known_location(building: &str, room: &str) -> bool {
    rooms(building).is_some_and(|rooms| rooms.contains(&room))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(buildings().len(), 6);
        assert!(rooms("saw").unwrap().contains(&"Library"));
        assert!(rooms("Rektorat").is_none());
        assert!(is_known_location("D4", "Lab D4-A"));
        assert!(!is_known_location("D4", "Library"));
    }

    #[test]
    fn test_seed_locations_are_catalogued() {
        for report in crate::seed::default_reports(chrono::Utc::now(), "%H:%M") {
            assert!(is_known_location(&report.building, &report.room), "{}", report);
            assert!(ISSUE_TYPES.contains(&report.issue_type.as_str()));
            assert!(DEVICES.contains(&report.device.as_str()));
        }
    }
}
