//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{
    DatabasePool, UserRepository, SchoolRepository, MemberRepository, SubjectRepository,
    ClassRepository, CalendarRepository, RecordRepository, AdminRepository,
};
use crate::models::MemberKind;
use crate::utils::errors::SchoolDeskError;

/// Tables counted on the admin index page
pub const STATS_TABLES: &[&str] = &[
    "users",
    "schools",
    "directors",
    "secretaries",
    "teachers",
    "students",
    "subjects",
    "classes",
    "academic_calendars",
    "lesson_records",
    "absence_records",
    "grade_records",
];

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub pool: DatabasePool,
    pub users: UserRepository,
    pub schools: SchoolRepository,
    pub members: MemberRepository,
    pub subjects: SubjectRepository,
    pub classes: ClassRepository,
    pub calendars: CalendarRepository,
    pub records: RecordRepository,
    pub admin: AdminRepository,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            schools: SchoolRepository::new(pool.clone()),
            members: MemberRepository::new(pool.clone()),
            subjects: SubjectRepository::new(pool.clone()),
            classes: ClassRepository::new(pool.clone()),
            calendars: CalendarRepository::new(pool.clone()),
            records: RecordRepository::new(pool.clone()),
            admin: AdminRepository::new(pool.clone()),
            pool,
        }
    }

    /// School with its calendar and staff and student counts
    pub async fn get_school_overview(&self, school_id: i64) -> Result<serde_json::Value, SchoolDeskError> {
        let school = self.schools.find_by_id(school_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("School", school_id))?;

        let calendar = self.schools.get_calendar(school_id).await?;

        let mut members = serde_json::Map::new();
        for kind in MemberKind::ALL {
            let count = self.members.list_for_school(*kind, school_id).await?.len();
            members.insert(kind.table().to_string(), serde_json::json!(count));
        }

        let subjects = self.subjects.list_for_school(school_id).await?;
        let classes = self.classes.list_for_school(school_id).await?;

        Ok(serde_json::json!({
            "school_type": school.school_type.label(),
            "school": school,
            "calendar": calendar,
            "members": members,
            "subjects": subjects.len(),
            "classes": classes.len()
        }))
    }

    /// Subject with its teachers, enrollment and lesson progress
    pub async fn get_subject_summary(&self, subject_id: i64) -> Result<serde_json::Value, SchoolDeskError> {
        let subject = self.subjects.find_by_id(subject_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("Subject", subject_id))?;

        let teachers = self.subjects.get_teachers(subject_id).await?;
        let student_count = self.subjects.student_count(subject_id).await?;
        let lessons = self.records.list_lessons_for_subject(subject_id).await?;

        Ok(serde_json::json!({
            "remaining_hours": subject.remaining_hours(),
            "subject": subject,
            "teachers": teachers,
            "student_count": student_count,
            "lessons_recorded": lessons.len()
        }))
    }

    /// Class with its students and subjects
    pub async fn get_class_summary(&self, class_id: i64) -> Result<serde_json::Value, SchoolDeskError> {
        let class = self.classes.find_by_id(class_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("Class", class_id))?;

        let students = self.classes.get_students(class_id).await?;
        let subjects = self.classes.get_subjects(class_id).await?;

        Ok(serde_json::json!({
            "class": class,
            "students": students,
            "subjects": subjects
        }))
    }

    /// Absences and per-subject grades of a student
    pub async fn get_student_report(&self, student_id: i64) -> Result<serde_json::Value, SchoolDeskError> {
        let student = self.members.find_by_id(MemberKind::Student, student_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("Student", student_id))?;

        let absences = self.records.list_absences_for_student(student_id).await?;

        let mut subjects = Vec::new();
        for subject in self.subjects.list_for_school(student.school_id).await? {
            let grades = self.records.list_grades(student_id, subject.id).await?;
            if grades.is_empty() {
                continue;
            }
            subjects.push(serde_json::json!({
                "subject_id": subject.id,
                "name": subject.name,
                "grades": grades
            }));
        }

        Ok(serde_json::json!({
            "student": student,
            "absences": absences,
            "grades": subjects
        }))
    }

    /// Row counts per table
    pub async fn get_system_stats(&self) -> Result<serde_json::Value, SchoolDeskError> {
        self.admin.get_stats(STATS_TABLES).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_service_creation() {
        let mut config = crate::config::Settings::default().database;
        config.min_connections = 0;
        let pool = crate::database::create_lazy_pool(&config).unwrap();
        let service = DatabaseService::new(pool);
        assert!(!service.pool.is_closed());
    }

    #[test]
    fn test_stats_tables_are_unique() {
        let unique: std::collections::HashSet<_> = STATS_TABLES.iter().collect();
        assert_eq!(unique.len(), STATS_TABLES.len());
    }
}
