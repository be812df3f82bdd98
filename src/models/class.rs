//! Class and class type models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClassType {
    pub id: i64,
    pub name: String,
}

/// A group of students sharing a set of subjects for one year
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Class {
    pub id: i64,
    pub class_type_id: i64,
    pub school_id: i64,
    pub year: i32,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassTypeRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassRequest {
    pub class_type_id: i64,
    pub school_id: i64,
    pub year: i32,
    pub code: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClassRequest {
    pub class_type_id: Option<i64>,
    pub year: Option<i32>,
    pub code: Option<String>,
}
