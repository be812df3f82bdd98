//! Subject repository implementation

use sqlx::PgPool;
use crate::models::member::SchoolMember;
use crate::models::subject::{Subject, CreateSubjectRequest, UpdateSubjectRequest};
use crate::utils::errors::SchoolDeskError;

const SUBJECT_COLUMNS: &str = "id, name, school_id, shift, required_hours, hours_taught, year, code";

#[derive(Clone)]
#[derive(Debug)]
pub struct SubjectRepository {
    pool: PgPool,
}

impl SubjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new subject
    pub async fn create(&self, request: CreateSubjectRequest) -> Result<Subject, SchoolDeskError> {
        let subject = sqlx::query_as::<_, Subject>(&format!(
            r#"
            INSERT INTO subjects (name, school_id, shift, required_hours, hours_taught, year, code)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SUBJECT_COLUMNS}
            "#
        ))
        .bind(request.name)
        .bind(request.school_id)
        .bind(request.shift)
        .bind(request.required_hours)
        .bind(request.hours_taught)
        .bind(request.year)
        .bind(request.code)
        .fetch_one(&self.pool)
        .await?;

        Ok(subject)
    }

    /// Find subject by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Subject>, SchoolDeskError> {
        let subject = sqlx::query_as::<_, Subject>(&format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(subject)
    }

    /// Update subject
    pub async fn update(&self, id: i64, request: UpdateSubjectRequest) -> Result<Subject, SchoolDeskError> {
        let subject = sqlx::query_as::<_, Subject>(&format!(
            r#"
            UPDATE subjects
            SET name = COALESCE($2, name),
                shift = COALESCE($3, shift),
                required_hours = COALESCE($4, required_hours),
                hours_taught = COALESCE($5, hours_taught),
                year = COALESCE($6, year),
                code = COALESCE($7, code)
            WHERE id = $1
            RETURNING {SUBJECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.name)
        .bind(request.shift)
        .bind(request.required_hours)
        .bind(request.hours_taught)
        .bind(request.year)
        .bind(request.code)
        .fetch_optional(&self.pool)
        .await?;

        subject.ok_or_else(|| SchoolDeskError::not_found("Subject", id))
    }

    /// Delete subject together with its lesson, absence and grade records
    pub async fn delete(&self, id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM subjects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Subjects offered by a school
    pub async fn list_for_school(&self, school_id: i64) -> Result<Vec<Subject>, SchoolDeskError> {
        let subjects = sqlx::query_as::<_, Subject>(&format!(
            "SELECT {SUBJECT_COLUMNS} FROM subjects WHERE school_id = $1 ORDER BY year DESC, name ASC"
        ))
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subjects)
    }

    /// Assign a teacher to a subject
    pub async fn add_teacher(&self, subject_id: i64, teacher_id: i64) -> Result<(), SchoolDeskError> {
        sqlx::query("INSERT INTO subject_teachers (subject_id, teacher_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(subject_id)
            .bind(teacher_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove a teacher from a subject
    pub async fn remove_teacher(&self, subject_id: i64, teacher_id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM subject_teachers WHERE subject_id = $1 AND teacher_id = $2")
            .bind(subject_id)
            .bind(teacher_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Teachers assigned to a subject
    pub async fn get_teachers(&self, subject_id: i64) -> Result<Vec<SchoolMember>, SchoolDeskError> {
        let teachers = sqlx::query_as::<_, SchoolMember>(
            r#"
            SELECT t.id, t.user_id, t.school_id
            FROM teachers t
            INNER JOIN subject_teachers st ON st.teacher_id = t.id
            WHERE st.subject_id = $1
            ORDER BY t.id ASC
            "#
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(teachers)
    }

    /// Enroll a student in a subject
    pub async fn add_student(&self, subject_id: i64, student_id: i64) -> Result<(), SchoolDeskError> {
        sqlx::query("INSERT INTO subject_students (subject_id, student_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(subject_id)
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Withdraw a student from a subject
    pub async fn remove_student(&self, subject_id: i64, student_id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM subject_students WHERE subject_id = $1 AND student_id = $2")
            .bind(subject_id)
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of students enrolled in a subject
    pub async fn student_count(&self, subject_id: i64) -> Result<i64, SchoolDeskError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM subject_students WHERE subject_id = $1")
            .bind(subject_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }
}
