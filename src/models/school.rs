//! School model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::text_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchoolType {
    Kindergarten,
    Elementary,
    HighSchool,
}

text_enum!(SchoolType {
    Kindergarten => "kindergarten",
    Elementary => "elementary",
    HighSchool => "high_school",
});

impl SchoolType {
    pub fn label(&self) -> &'static str {
        match self {
            SchoolType::Kindergarten => "Kindergarten",
            SchoolType::Elementary => "Elementary School",
            SchoolType::HighSchool => "High School",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct School {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub school_type: SchoolType,
    /// Cleared, not cascaded, when the director is deleted
    pub director_id: Option<i64>,
    pub calendar_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSchoolRequest {
    pub name: String,
    pub address: String,
    pub school_type: SchoolType,
    pub calendar_id: Option<i64>,
}

/// Changes to a school.
///
/// The director link is managed through director membership, see
/// `MemberRepository::create`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSchoolRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub school_type: Option<SchoolType>,
    /// `null` detaches the calendar; a missing key leaves it unchanged
    #[serde(default, deserialize_with = "super::nullable", skip_serializing_if = "Option::is_none")]
    pub calendar_id: Option<Option<i64>>,
}
