//! Academic calendar repository implementation

use sqlx::PgPool;
use crate::models::calendar::{AcademicCalendar, CreateCalendarRequest};
use crate::utils::errors::SchoolDeskError;

const CALENDAR_COLUMNS: &str = "id, year, academic_year_start, academic_year_end, vacation_start, vacation_end, holidays";

#[derive(Clone)]
#[derive(Debug)]
pub struct CalendarRepository {
    pool: PgPool,
}

impl CalendarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new calendar
    pub async fn create(&self, request: CreateCalendarRequest) -> Result<AcademicCalendar, SchoolDeskError> {
        let calendar = sqlx::query_as::<_, AcademicCalendar>(&format!(
            r#"
            INSERT INTO academic_calendars (year, academic_year_start, academic_year_end, vacation_start, vacation_end, holidays)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CALENDAR_COLUMNS}
            "#
        ))
        .bind(request.year)
        .bind(request.academic_year_start)
        .bind(request.academic_year_end)
        .bind(request.vacation_start)
        .bind(request.vacation_end)
        .bind(request.holidays)
        .fetch_one(&self.pool)
        .await?;

        Ok(calendar)
    }

    /// Find calendar by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<AcademicCalendar>, SchoolDeskError> {
        let calendar = sqlx::query_as::<_, AcademicCalendar>(&format!(
            "SELECT {CALENDAR_COLUMNS} FROM academic_calendars WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(calendar)
    }

    /// Write back a whole calendar; callers validate the ranges first
    pub async fn save(&self, calendar: &AcademicCalendar) -> Result<AcademicCalendar, SchoolDeskError> {
        let saved = sqlx::query_as::<_, AcademicCalendar>(&format!(
            r#"
            UPDATE academic_calendars
            SET year = $2,
                academic_year_start = $3,
                academic_year_end = $4,
                vacation_start = $5,
                vacation_end = $6,
                holidays = $7
            WHERE id = $1
            RETURNING {CALENDAR_COLUMNS}
            "#
        ))
        .bind(calendar.id)
        .bind(calendar.year)
        .bind(calendar.academic_year_start)
        .bind(calendar.academic_year_end)
        .bind(calendar.vacation_start)
        .bind(calendar.vacation_end)
        .bind(&calendar.holidays)
        .fetch_optional(&self.pool)
        .await?;

        saved.ok_or_else(|| SchoolDeskError::not_found("AcademicCalendar", calendar.id))
    }

    /// Delete calendar; schools using it are left without one
    pub async fn delete(&self, id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM academic_calendars WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Calendars for a given year
    pub async fn list_by_year(&self, year: i32) -> Result<Vec<AcademicCalendar>, SchoolDeskError> {
        let calendars = sqlx::query_as::<_, AcademicCalendar>(&format!(
            "SELECT {CALENDAR_COLUMNS} FROM academic_calendars WHERE year = $1 ORDER BY academic_year_start ASC"
        ))
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(calendars)
    }

    /// Calendar governing a subject, through the subject's school
    pub async fn find_for_subject(&self, subject_id: i64) -> Result<Option<AcademicCalendar>, SchoolDeskError> {
        let calendar = sqlx::query_as::<_, AcademicCalendar>(
            r#"
            SELECT c.id, c.year, c.academic_year_start, c.academic_year_end, c.vacation_start, c.vacation_end, c.holidays
            FROM academic_calendars c
            INNER JOIN schools s ON s.calendar_id = c.id
            INNER JOIN subjects sub ON sub.school_id = s.id
            WHERE sub.id = $1
            "#
        )
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(calendar)
    }
}
