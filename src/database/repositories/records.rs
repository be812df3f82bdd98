//! Lesson, absence and grade record repository implementation

use sqlx::{PgPool, Postgres, Transaction};
use crate::models::calendar::AcademicCalendar;
use crate::models::records::{
    LessonRecord, AbsenceRecord, GradeRecord, CreateLessonRequest, UpdateLessonRequest,
    CreateAbsenceRequest, UpdateAbsenceRequest, CreateGradeRequest, UpdateGradeRequest,
};
use crate::utils::errors::SchoolDeskError;

#[derive(Clone)]
#[derive(Debug)]
pub struct RecordRepository {
    pool: PgPool,
}

/// Load the calendar that governs `subject_id` and check `date` against it.
///
/// The calendar row is share-locked so it cannot change before the caller's
/// transaction commits.
async fn check_lesson_date(
    tx: &mut Transaction<'_, Postgres>,
    subject_id: i64,
    date: chrono::NaiveDate,
) -> Result<(), SchoolDeskError> {
    let subject_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM subjects WHERE id = $1")
        .bind(subject_id)
        .fetch_optional(&mut **tx)
        .await?;
    if subject_exists.is_none() {
        return Err(SchoolDeskError::not_found("Subject", subject_id));
    }

    let calendar = sqlx::query_as::<_, AcademicCalendar>(
        r#"
        SELECT c.id, c.year, c.academic_year_start, c.academic_year_end, c.vacation_start, c.vacation_end, c.holidays
        FROM academic_calendars c
        INNER JOIN schools s ON s.calendar_id = c.id
        INNER JOIN subjects sub ON sub.school_id = s.id
        WHERE sub.id = $1
        FOR SHARE OF c
        "#
    )
    .bind(subject_id)
    .fetch_optional(&mut **tx)
    .await?;

    match calendar {
        Some(calendar) => calendar.check_date(date),
        None => Err(SchoolDeskError::Validation(format!(
            "No academic calendar configured for the school of subject {}",
            subject_id
        ))),
    }
}

impl RecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a lesson record, rejecting dates the school's calendar does not permit
    pub async fn create_lesson(&self, request: CreateLessonRequest) -> Result<LessonRecord, SchoolDeskError> {
        let mut tx = self.pool.begin().await?;

        check_lesson_date(&mut tx, request.subject_id, request.lesson_date).await?;

        let lesson = sqlx::query_as::<_, LessonRecord>(
            r#"
            INSERT INTO lesson_records (subject_id, lesson_date, content)
            VALUES ($1, $2, $3)
            RETURNING id, subject_id, lesson_date, content
            "#
        )
        .bind(request.subject_id)
        .bind(request.lesson_date)
        .bind(request.content)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(lesson)
    }

    /// Find lesson record by ID
    pub async fn find_lesson(&self, id: i64) -> Result<Option<LessonRecord>, SchoolDeskError> {
        let lesson = sqlx::query_as::<_, LessonRecord>(
            "SELECT id, subject_id, lesson_date, content FROM lesson_records WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(lesson)
    }

    /// Update a lesson record; a changed date or subject is checked again
    pub async fn update_lesson(&self, id: i64, request: UpdateLessonRequest) -> Result<LessonRecord, SchoolDeskError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, LessonRecord>(
            "SELECT id, subject_id, lesson_date, content FROM lesson_records WHERE id = $1 FOR UPDATE"
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| SchoolDeskError::not_found("LessonRecord", id))?;

        let subject_id = request.subject_id.unwrap_or(current.subject_id);
        let lesson_date = request.lesson_date.unwrap_or(current.lesson_date);
        if subject_id != current.subject_id || lesson_date != current.lesson_date {
            check_lesson_date(&mut tx, subject_id, lesson_date).await?;
        }

        let lesson = sqlx::query_as::<_, LessonRecord>(
            r#"
            UPDATE lesson_records
            SET subject_id = $2, lesson_date = $3, content = COALESCE($4, content)
            WHERE id = $1
            RETURNING id, subject_id, lesson_date, content
            "#
        )
        .bind(id)
        .bind(subject_id)
        .bind(lesson_date)
        .bind(request.content)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(lesson)
    }

    /// Delete lesson record
    pub async fn delete_lesson(&self, id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM lesson_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lessons given for a subject, oldest first
    pub async fn list_lessons_for_subject(&self, subject_id: i64) -> Result<Vec<LessonRecord>, SchoolDeskError> {
        let lessons = sqlx::query_as::<_, LessonRecord>(
            "SELECT id, subject_id, lesson_date, content FROM lesson_records WHERE subject_id = $1 ORDER BY lesson_date ASC"
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lessons)
    }

    /// Create an absence record
    pub async fn create_absence(&self, request: CreateAbsenceRequest) -> Result<AbsenceRecord, SchoolDeskError> {
        let absence = sqlx::query_as::<_, AbsenceRecord>(
            r#"
            INSERT INTO absence_records (student_id, subject_id, absence_date)
            VALUES ($1, $2, $3)
            RETURNING id, student_id, subject_id, absence_date
            "#
        )
        .bind(request.student_id)
        .bind(request.subject_id)
        .bind(request.absence_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(absence)
    }

    /// Find absence record by ID
    pub async fn find_absence(&self, id: i64) -> Result<Option<AbsenceRecord>, SchoolDeskError> {
        let absence = sqlx::query_as::<_, AbsenceRecord>(
            "SELECT id, student_id, subject_id, absence_date FROM absence_records WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(absence)
    }

    /// Update absence record
    pub async fn update_absence(&self, id: i64, request: UpdateAbsenceRequest) -> Result<AbsenceRecord, SchoolDeskError> {
        let absence = sqlx::query_as::<_, AbsenceRecord>(
            r#"
            UPDATE absence_records
            SET student_id = COALESCE($2, student_id),
                subject_id = COALESCE($3, subject_id),
                absence_date = COALESCE($4, absence_date)
            WHERE id = $1
            RETURNING id, student_id, subject_id, absence_date
            "#
        )
        .bind(id)
        .bind(request.student_id)
        .bind(request.subject_id)
        .bind(request.absence_date)
        .fetch_optional(&self.pool)
        .await?;

        absence.ok_or_else(|| SchoolDeskError::not_found("AbsenceRecord", id))
    }

    /// Delete absence record
    pub async fn delete_absence(&self, id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM absence_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Absences of a student, newest first
    pub async fn list_absences_for_student(&self, student_id: i64) -> Result<Vec<AbsenceRecord>, SchoolDeskError> {
        let absences = sqlx::query_as::<_, AbsenceRecord>(
            "SELECT id, student_id, subject_id, absence_date FROM absence_records WHERE student_id = $1 ORDER BY absence_date DESC"
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(absences)
    }

    /// Create a grade record
    pub async fn create_grade(&self, request: CreateGradeRequest) -> Result<GradeRecord, SchoolDeskError> {
        let grade = sqlx::query_as::<_, GradeRecord>(
            r#"
            INSERT INTO grade_records (student_id, subject_id, grade, grade_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, student_id, subject_id, grade, grade_date
            "#
        )
        .bind(request.student_id)
        .bind(request.subject_id)
        .bind(request.grade)
        .bind(request.grade_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(grade)
    }

    /// Find grade record by ID
    pub async fn find_grade(&self, id: i64) -> Result<Option<GradeRecord>, SchoolDeskError> {
        let grade = sqlx::query_as::<_, GradeRecord>(
            "SELECT id, student_id, subject_id, grade, grade_date FROM grade_records WHERE id = $1"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(grade)
    }

    /// Update grade record
    pub async fn update_grade(&self, id: i64, request: UpdateGradeRequest) -> Result<GradeRecord, SchoolDeskError> {
        let grade = sqlx::query_as::<_, GradeRecord>(
            r#"
            UPDATE grade_records
            SET student_id = COALESCE($2, student_id),
                subject_id = COALESCE($3, subject_id),
                grade = COALESCE($4, grade),
                grade_date = COALESCE($5, grade_date)
            WHERE id = $1
            RETURNING id, student_id, subject_id, grade, grade_date
            "#
        )
        .bind(id)
        .bind(request.student_id)
        .bind(request.subject_id)
        .bind(request.grade)
        .bind(request.grade_date)
        .fetch_optional(&self.pool)
        .await?;

        grade.ok_or_else(|| SchoolDeskError::not_found("GradeRecord", id))
    }

    /// Delete grade record
    pub async fn delete_grade(&self, id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM grade_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Grades of a student in a subject, oldest first
    pub async fn list_grades(&self, student_id: i64, subject_id: i64) -> Result<Vec<GradeRecord>, SchoolDeskError> {
        let grades = sqlx::query_as::<_, GradeRecord>(
            "SELECT id, student_id, subject_id, grade, grade_date FROM grade_records WHERE student_id = $1 AND subject_id = $2 ORDER BY grade_date ASC"
        )
        .bind(student_id)
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(grades)
    }
}
