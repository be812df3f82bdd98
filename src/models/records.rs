//! Lesson, absence and grade records

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::errors::{Result, SchoolDeskError};

/// Digits a grade may carry in total
pub const GRADE_MAX_DIGITS: u32 = 5;
/// Digits a grade may carry after the decimal point
pub const GRADE_DECIMAL_PLACES: u32 = 2;

/// A lesson given for a subject; its date must be permitted by the school's calendar
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LessonRecord {
    pub id: i64,
    pub subject_id: i64,
    pub lesson_date: NaiveDate,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AbsenceRecord {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub absence_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GradeRecord {
    pub id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub grade: Decimal,
    pub grade_date: NaiveDate,
}

/// Check a grade fits NUMERIC(5, 2).
///
/// Extra fraction digits are rejected rather than rounded.
pub fn validate_grade(grade: &Decimal) -> Result<()> {
    let normalized = grade.normalize();
    if normalized.scale() > GRADE_DECIMAL_PLACES {
        return Err(SchoolDeskError::Validation(format!(
            "Grade {} has more than {} decimal places",
            grade, GRADE_DECIMAL_PLACES
        )));
    }

    let limit = Decimal::from(10i64.pow(GRADE_MAX_DIGITS - GRADE_DECIMAL_PLACES));
    if normalized.abs() >= limit {
        return Err(SchoolDeskError::Validation(format!(
            "Grade {} has more than {} digits before the decimal point",
            grade,
            GRADE_MAX_DIGITS - GRADE_DECIMAL_PLACES
        )));
    }

    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLessonRequest {
    pub subject_id: i64,
    pub lesson_date: NaiveDate,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateLessonRequest {
    pub subject_id: Option<i64>,
    pub lesson_date: Option<NaiveDate>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAbsenceRequest {
    pub student_id: i64,
    pub subject_id: i64,
    pub absence_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAbsenceRequest {
    pub student_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub absence_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGradeRequest {
    pub student_id: i64,
    pub subject_id: i64,
    pub grade: Decimal,
    pub grade_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateGradeRequest {
    pub student_id: Option<i64>,
    pub subject_id: Option<i64>,
    pub grade: Option<Decimal>,
    pub grade_date: Option<NaiveDate>,
}
