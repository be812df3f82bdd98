//! School repository implementation

use sqlx::PgPool;
use crate::models::calendar::AcademicCalendar;
use crate::models::school::{School, CreateSchoolRequest, UpdateSchoolRequest};
use crate::utils::errors::SchoolDeskError;

const SCHOOL_COLUMNS: &str = "id, name, address, school_type, director_id, calendar_id";

#[derive(Clone)]
#[derive(Debug)]
pub struct SchoolRepository {
    pool: PgPool,
}

impl SchoolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new school
    pub async fn create(&self, request: CreateSchoolRequest) -> Result<School, SchoolDeskError> {
        let school = sqlx::query_as::<_, School>(&format!(
            r#"
            INSERT INTO schools (name, address, school_type, calendar_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {SCHOOL_COLUMNS}
            "#
        ))
        .bind(request.name)
        .bind(request.address)
        .bind(request.school_type)
        .bind(request.calendar_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(school)
    }

    /// Find school by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<School>, SchoolDeskError> {
        let school = sqlx::query_as::<_, School>(&format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(school)
    }

    /// Update school; `calendar_id: Some(None)` detaches the calendar
    pub async fn update(&self, id: i64, request: UpdateSchoolRequest) -> Result<School, SchoolDeskError> {
        let school = sqlx::query_as::<_, School>(&format!(
            r#"
            UPDATE schools
            SET name = COALESCE($2, name),
                address = COALESCE($3, address),
                school_type = COALESCE($4, school_type),
                calendar_id = CASE WHEN $6 THEN $5 ELSE calendar_id END
            WHERE id = $1
            RETURNING {SCHOOL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.name)
        .bind(request.address)
        .bind(request.school_type)
        .bind(request.calendar_id.flatten())
        .bind(request.calendar_id.is_some())
        .fetch_optional(&self.pool)
        .await?;

        school.ok_or_else(|| SchoolDeskError::not_found("School", id))
    }

    /// Delete school.
    ///
    /// The store cascades to the school's director, secretaries, teachers,
    /// students, subjects and classes, and through them to their records.
    pub async fn delete(&self, id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM schools WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Academic calendar of the school, if one is attached
    pub async fn get_calendar(&self, school_id: i64) -> Result<Option<AcademicCalendar>, SchoolDeskError> {
        let calendar = sqlx::query_as::<_, AcademicCalendar>(
            r#"
            SELECT c.id, c.year, c.academic_year_start, c.academic_year_end, c.vacation_start, c.vacation_end, c.holidays
            FROM academic_calendars c
            INNER JOIN schools s ON s.calendar_id = c.id
            WHERE s.id = $1
            "#
        )
        .bind(school_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(calendar)
    }
}
