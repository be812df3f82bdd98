//! Subject model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::text_enum;

/// Time-of-day slot a subject is taught in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shift {
    Morning,
    Afternoon,
    Night,
}

text_enum!(Shift {
    Morning => "morning",
    Afternoon => "afternoon",
    Night => "night",
});

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub school_id: i64,
    pub shift: Shift,
    pub required_hours: i32,
    pub hours_taught: i32,
    pub year: i32,
    pub code: String,
}

impl Subject {
    /// Hours still to be taught; negative once the subject runs over
    pub fn remaining_hours(&self) -> i32 {
        self.required_hours - self.hours_taught
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubjectRequest {
    pub name: String,
    pub school_id: i64,
    pub shift: Shift,
    pub required_hours: i32,
    #[serde(default)]
    pub hours_taught: i32,
    pub year: i32,
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub shift: Option<Shift>,
    pub required_hours: Option<i32>,
    pub hours_taught: Option<i32>,
    pub year: Option<i32>,
    pub code: Option<String>,
}
