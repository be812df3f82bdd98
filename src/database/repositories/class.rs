//! Class and class type repository implementation

use sqlx::PgPool;
use crate::models::class::{ClassType, Class, CreateClassTypeRequest, CreateClassRequest, UpdateClassRequest};
use crate::models::member::SchoolMember;
use crate::models::subject::Subject;
use crate::utils::errors::SchoolDeskError;

const CLASS_COLUMNS: &str = "id, class_type_id, school_id, year, code";

#[derive(Clone)]
#[derive(Debug)]
pub struct ClassRepository {
    pool: PgPool,
}

impl ClassRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new class type
    pub async fn create_type(&self, request: CreateClassTypeRequest) -> Result<ClassType, SchoolDeskError> {
        let class_type = sqlx::query_as::<_, ClassType>(
            "INSERT INTO class_types (name) VALUES ($1) RETURNING id, name"
        )
        .bind(request.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(class_type)
    }

    /// Find class type by ID
    pub async fn find_type_by_id(&self, id: i64) -> Result<Option<ClassType>, SchoolDeskError> {
        let class_type = sqlx::query_as::<_, ClassType>("SELECT id, name FROM class_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(class_type)
    }

    /// Rename a class type
    pub async fn rename_type(&self, id: i64, name: &str) -> Result<ClassType, SchoolDeskError> {
        let class_type = sqlx::query_as::<_, ClassType>(
            "UPDATE class_types SET name = $2 WHERE id = $1 RETURNING id, name"
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        class_type.ok_or_else(|| SchoolDeskError::not_found("ClassType", id))
    }

    /// Delete class type together with its classes
    pub async fn delete_type(&self, id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM class_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Create a new class
    pub async fn create(&self, request: CreateClassRequest) -> Result<Class, SchoolDeskError> {
        let class = sqlx::query_as::<_, Class>(&format!(
            r#"
            INSERT INTO classes (class_type_id, school_id, year, code)
            VALUES ($1, $2, $3, $4)
            RETURNING {CLASS_COLUMNS}
            "#
        ))
        .bind(request.class_type_id)
        .bind(request.school_id)
        .bind(request.year)
        .bind(request.code)
        .fetch_one(&self.pool)
        .await?;

        Ok(class)
    }

    /// Find class by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Class>, SchoolDeskError> {
        let class = sqlx::query_as::<_, Class>(&format!("SELECT {CLASS_COLUMNS} FROM classes WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(class)
    }

    /// Update class
    pub async fn update(&self, id: i64, request: UpdateClassRequest) -> Result<Class, SchoolDeskError> {
        let class = sqlx::query_as::<_, Class>(&format!(
            r#"
            UPDATE classes
            SET class_type_id = COALESCE($2, class_type_id),
                year = COALESCE($3, year),
                code = COALESCE($4, code)
            WHERE id = $1
            RETURNING {CLASS_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(request.class_type_id)
        .bind(request.year)
        .bind(request.code)
        .fetch_optional(&self.pool)
        .await?;

        class.ok_or_else(|| SchoolDeskError::not_found("Class", id))
    }

    /// Delete class
    pub async fn delete(&self, id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM classes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Classes of a school
    pub async fn list_for_school(&self, school_id: i64) -> Result<Vec<Class>, SchoolDeskError> {
        let classes = sqlx::query_as::<_, Class>(&format!(
            "SELECT {CLASS_COLUMNS} FROM classes WHERE school_id = $1 ORDER BY year DESC, code ASC"
        ))
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(classes)
    }

    /// Add a student to a class
    pub async fn add_student(&self, class_id: i64, student_id: i64) -> Result<(), SchoolDeskError> {
        sqlx::query("INSERT INTO class_students (class_id, student_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(class_id)
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove a student from a class
    pub async fn remove_student(&self, class_id: i64, student_id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM class_students WHERE class_id = $1 AND student_id = $2")
            .bind(class_id)
            .bind(student_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Students in a class
    pub async fn get_students(&self, class_id: i64) -> Result<Vec<SchoolMember>, SchoolDeskError> {
        let students = sqlx::query_as::<_, SchoolMember>(
            r#"
            SELECT s.id, s.user_id, s.school_id
            FROM students s
            INNER JOIN class_students cs ON cs.student_id = s.id
            WHERE cs.class_id = $1
            ORDER BY s.id ASC
            "#
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(students)
    }

    /// Add a subject to a class
    pub async fn add_subject(&self, class_id: i64, subject_id: i64) -> Result<(), SchoolDeskError> {
        sqlx::query("INSERT INTO class_subjects (class_id, subject_id) VALUES ($1, $2) ON CONFLICT DO NOTHING")
            .bind(class_id)
            .bind(subject_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Remove a subject from a class
    pub async fn remove_subject(&self, class_id: i64, subject_id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query("DELETE FROM class_subjects WHERE class_id = $1 AND subject_id = $2")
            .bind(class_id)
            .bind(subject_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Subjects taught to a class
    pub async fn get_subjects(&self, class_id: i64) -> Result<Vec<Subject>, SchoolDeskError> {
        let subjects = sqlx::query_as::<_, Subject>(
            r#"
            SELECT s.id, s.name, s.school_id, s.shift, s.required_hours, s.hours_taught, s.year, s.code
            FROM subjects s
            INNER JOIN class_subjects cs ON cs.subject_id = s.id
            WHERE cs.class_id = $1
            ORDER BY s.name ASC
            "#
        )
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subjects)
    }
}
