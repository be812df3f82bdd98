//! Lesson, absence and grade record service implementation

use tracing::{info, debug};
use crate::database::repositories::RecordRepository;
use crate::models::records::{
    validate_grade, LessonRecord, AbsenceRecord, GradeRecord, CreateLessonRequest, UpdateLessonRequest,
    CreateAbsenceRequest, UpdateAbsenceRequest, CreateGradeRequest, UpdateGradeRequest,
};
use crate::utils::errors::{SchoolDeskError, Result};
use crate::utils::logging::log_validation_failure;

/// Log validation failures before handing them back
fn logged<T>(entity: &str, result: Result<T>) -> Result<T> {
    if let Err(SchoolDeskError::Validation(reason)) = &result {
        log_validation_failure(entity, reason);
    }
    result
}

#[derive(Clone)]
#[derive(Debug)]
pub struct RecordService {
    record_repository: RecordRepository,
}

impl RecordService {
    pub fn new(record_repository: RecordRepository) -> Self {
        Self { record_repository }
    }

    /// Record a lesson; the date must be a permitted day of the school's calendar
    pub async fn record_lesson(&self, request: CreateLessonRequest) -> Result<LessonRecord> {
        debug!(subject_id = request.subject_id, date = %request.lesson_date, "Recording lesson");

        let lesson = logged("LessonRecord", self.record_repository.create_lesson(request).await)?;
        info!(lesson_id = lesson.id, subject_id = lesson.subject_id, date = %lesson.lesson_date, "Lesson recorded");
        Ok(lesson)
    }

    pub async fn get_lesson(&self, lesson_id: i64) -> Result<LessonRecord> {
        self.record_repository.find_lesson(lesson_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("LessonRecord", lesson_id))
    }

    pub async fn update_lesson(&self, lesson_id: i64, request: UpdateLessonRequest) -> Result<LessonRecord> {
        let lesson = logged("LessonRecord", self.record_repository.update_lesson(lesson_id, request).await)?;
        info!(lesson_id = lesson.id, "Lesson updated");
        Ok(lesson)
    }

    pub async fn delete_lesson(&self, lesson_id: i64) -> Result<()> {
        if !self.record_repository.delete_lesson(lesson_id).await? {
            return Err(SchoolDeskError::not_found("LessonRecord", lesson_id));
        }
        info!(lesson_id = lesson_id, "Lesson deleted");
        Ok(())
    }

    /// Record a student's absence from a subject
    pub async fn record_absence(&self, request: CreateAbsenceRequest) -> Result<AbsenceRecord> {
        let absence = self.record_repository.create_absence(request).await?;
        info!(absence_id = absence.id, student_id = absence.student_id, subject_id = absence.subject_id, "Absence recorded");
        Ok(absence)
    }

    pub async fn get_absence(&self, absence_id: i64) -> Result<AbsenceRecord> {
        self.record_repository.find_absence(absence_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("AbsenceRecord", absence_id))
    }

    pub async fn update_absence(&self, absence_id: i64, request: UpdateAbsenceRequest) -> Result<AbsenceRecord> {
        self.record_repository.update_absence(absence_id, request).await
    }

    pub async fn delete_absence(&self, absence_id: i64) -> Result<()> {
        if !self.record_repository.delete_absence(absence_id).await? {
            return Err(SchoolDeskError::not_found("AbsenceRecord", absence_id));
        }
        info!(absence_id = absence_id, "Absence deleted");
        Ok(())
    }

    /// Record a grade; it must fit five digits with two decimal places
    pub async fn record_grade(&self, request: CreateGradeRequest) -> Result<GradeRecord> {
        logged("GradeRecord", validate_grade(&request.grade))?;

        let grade = self.record_repository.create_grade(request).await?;
        info!(grade_id = grade.id, student_id = grade.student_id, subject_id = grade.subject_id, "Grade recorded");
        Ok(grade)
    }

    pub async fn get_grade(&self, grade_id: i64) -> Result<GradeRecord> {
        self.record_repository.find_grade(grade_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("GradeRecord", grade_id))
    }

    pub async fn update_grade(&self, grade_id: i64, request: UpdateGradeRequest) -> Result<GradeRecord> {
        if let Some(grade) = &request.grade {
            logged("GradeRecord", validate_grade(grade))?;
        }
        self.record_repository.update_grade(grade_id, request).await
    }

    pub async fn delete_grade(&self, grade_id: i64) -> Result<()> {
        if !self.record_repository.delete_grade(grade_id).await? {
            return Err(SchoolDeskError::not_found("GradeRecord", grade_id));
        }
        info!(grade_id = grade_id, "Grade deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn lazy_service() -> RecordService {
        let mut config = crate::config::Settings::default().database;
        config.min_connections = 0;
        let pool = crate::database::create_lazy_pool(&config).unwrap();
        RecordService::new(RecordRepository::new(pool))
    }

    #[tokio::test]
    async fn test_oversized_grade_rejected_before_storage() {
        let service = lazy_service();
        let request = CreateGradeRequest {
            student_id: 1,
            subject_id: 1,
            grade: Decimal::from_str("1000.00").unwrap(),
            grade_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
        };
        assert_matches!(service.record_grade(request).await, Err(SchoolDeskError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_with_too_many_decimals_rejected() {
        let service = lazy_service();
        let request = UpdateGradeRequest {
            grade: Some(Decimal::from_str("9.125").unwrap()),
            ..Default::default()
        };
        assert_matches!(service.update_grade(1, request).await, Err(SchoolDeskError::Validation(_)));
    }

    #[test]
    fn test_logged_passes_result_through() {
        assert_eq!(logged::<i32>("GradeRecord", Ok(3)).unwrap(), 3);
        assert_matches!(
            logged::<()>("GradeRecord", Err(SchoolDeskError::Validation("bad".into()))),
            Err(SchoolDeskError::Validation(msg)) if msg == "bad"
        );
    }
}
