//! Room model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use timetable_core::availability::Availability;
use timetable_core::catalog::RoomKind;
use timetable_core::error::CoreError;
use timetable_core::types::{DbId, Timestamp};

/// A row from the `rooms` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Room {
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String,
    pub capacity: i32,
    pub availability: Json<Availability>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Room {
    pub fn kind(&self) -> Result<RoomKind, CoreError> {
        self.room_type.parse()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoom {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RoomKind,
    pub capacity: i32,
    /// Defaults to every slot of the standard grid.
    pub availability: Option<Availability>,
}

impl CreateRoom {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("Room name is required".into()));
        }
        if self.capacity <= 0 {
            return Err(CoreError::Validation("capacity must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRoom {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<RoomKind>,
    pub capacity: Option<i32>,
    pub availability: Option<Availability>,
}
