//! Academic calendar service implementation

use chrono::NaiveDate;
use tracing::{info, debug};
use crate::database::repositories::CalendarRepository;
use crate::models::calendar::{AcademicCalendar, CreateCalendarRequest, UpdateCalendarRequest};
use crate::utils::errors::{SchoolDeskError, Result};
use crate::utils::logging::log_validation_failure;

#[derive(Clone)]
#[derive(Debug)]
pub struct CalendarService {
    calendar_repository: CalendarRepository,
}

impl CalendarService {
    pub fn new(calendar_repository: CalendarRepository) -> Self {
        Self { calendar_repository }
    }

    /// Create a calendar after checking its ranges
    pub async fn create_calendar(&self, mut request: CreateCalendarRequest) -> Result<AcademicCalendar> {
        if let Err(e) = request.validate() {
            log_validation_failure("AcademicCalendar", &e.to_string());
            return Err(e);
        }

        request.holidays.sort();
        request.holidays.dedup();

        let calendar = self.calendar_repository.create(request).await?;
        info!(
            calendar_id = calendar.id,
            year = calendar.year,
            permitted_days = calendar.permitted_days(),
            "Academic calendar created"
        );
        Ok(calendar)
    }

    pub async fn get_calendar(&self, calendar_id: i64) -> Result<AcademicCalendar> {
        self.calendar_repository.find_by_id(calendar_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("AcademicCalendar", calendar_id))
    }

    /// Apply a partial update; the merged calendar must still be valid
    pub async fn update_calendar(&self, calendar_id: i64, request: UpdateCalendarRequest) -> Result<AcademicCalendar> {
        let current = self.get_calendar(calendar_id).await?;
        let mut updated = request.apply_to(&current);

        if let Err(e) = updated.validate() {
            log_validation_failure("AcademicCalendar", &e.to_string());
            return Err(e);
        }

        updated.holidays.sort();
        updated.holidays.dedup();

        let calendar = self.calendar_repository.save(&updated).await?;
        info!(calendar_id = calendar.id, year = calendar.year, "Academic calendar updated");
        Ok(calendar)
    }

    /// Delete a calendar; schools that used it are left without one
    pub async fn delete_calendar(&self, calendar_id: i64) -> Result<()> {
        if !self.calendar_repository.delete(calendar_id).await? {
            return Err(SchoolDeskError::not_found("AcademicCalendar", calendar_id));
        }

        info!(calendar_id = calendar_id, "Academic calendar deleted");
        Ok(())
    }

    pub async fn list_by_year(&self, year: i32) -> Result<Vec<AcademicCalendar>> {
        self.calendar_repository.list_by_year(year).await
    }

    /// Whether a lesson for `subject_id` could be recorded on `date`.
    ///
    /// Read-only preview; recording the lesson checks again under a lock.
    pub async fn is_lesson_date_permitted(&self, subject_id: i64, date: NaiveDate) -> Result<bool> {
        let permitted = match self.calendar_repository.find_for_subject(subject_id).await? {
            Some(calendar) => calendar.is_date_permitted(date),
            None => false,
        };

        debug!(subject_id = subject_id, date = %date, permitted = permitted, "Lesson date checked");
        Ok(permitted)
    }
}
