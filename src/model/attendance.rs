use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Day presence, encoded on the wire as 0.0 / 0.5 / 1.0.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "f32", try_from = "f32")]
pub enum Presence {
    Absent,
    HalfDay,
    FullDay,
}

impl Presence {
    pub const ALL: [Presence; 3] = [Presence::Absent, Presence::HalfDay, Presence::FullDay];

    pub fn value(self) -> f32 {
        match self {
            Presence::Absent => 0.0,
            Presence::HalfDay => 0.5,
            Presence::FullDay => 1.0,
        }
    }
}

impl From<Presence> for f32 {
    fn from(p: Presence) -> Self {
        p.value()
    }
}

impl TryFrom<f32> for Presence {
    type Error = String;

    fn try_from(v: f32) -> Result<Self, Self::Error> {
        Presence::ALL
            .into_iter()
            .find(|p| p.value() == v)
            .ok_or_else(|| format!("invalid presence value {v}, expected 0, 0.5 or 1"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: String,
    pub vendor_id: String,

    /// Identity of the record within a vendor's list; compared as an exact instant
    #[schema(value_type = String, format = DateTime)]
    pub date: DateTime<Local>,

    #[schema(value_type = String, format = DateTime)]
    pub login_time: DateTime<Local>,

    #[schema(value_type = String, format = DateTime)]
    pub logout_time: DateTime<Local>,

    /// Hours between login and logout
    #[schema(example = 8.5)]
    pub duration: f32,

    #[schema(value_type = f32, example = 1.0)]
    pub present_day: Presence,
}
