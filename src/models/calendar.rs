//! Academic calendar model
//!
//! A calendar defines the window in which lessons may be given for one
//! school year: the academic year itself, minus a vacation window, minus a
//! set of holidays.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::errors::{Result, SchoolDeskError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AcademicCalendar {
    pub id: i64,
    pub year: i32,
    pub academic_year_start: NaiveDate,
    pub academic_year_end: NaiveDate,
    pub vacation_start: NaiveDate,
    pub vacation_end: NaiveDate,
    pub holidays: Vec<NaiveDate>,
}

/// Why a date is not a valid lesson date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRejection {
    BeforeAcademicYear,
    AfterAcademicYear,
    DuringVacation,
    Holiday,
}

impl std::fmt::Display for DateRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            DateRejection::BeforeAcademicYear => "is before the start of the academic year",
            DateRejection::AfterAcademicYear => "is after the end of the academic year",
            DateRejection::DuringVacation => "falls within the vacation period",
            DateRejection::Holiday => "is a holiday",
        };
        f.write_str(reason)
    }
}

impl AcademicCalendar {
    /// Whether a lesson may take place on `date`.
    ///
    /// Both windows are inclusive on both ends.
    pub fn is_date_permitted(&self, date: NaiveDate) -> bool {
        self.rejection_reason(date).is_none()
    }

    /// The first rule `date` breaks, or `None` when it is a valid lesson date
    pub fn rejection_reason(&self, date: NaiveDate) -> Option<DateRejection> {
        if date < self.academic_year_start {
            return Some(DateRejection::BeforeAcademicYear);
        }
        if date > self.academic_year_end {
            return Some(DateRejection::AfterAcademicYear);
        }
        if self.vacation_start <= date && date <= self.vacation_end {
            return Some(DateRejection::DuringVacation);
        }
        if self.holidays.contains(&date) {
            return Some(DateRejection::Holiday);
        }
        None
    }

    /// Reject a `date` with a validation error naming the broken rule
    pub fn check_date(&self, date: NaiveDate) -> Result<()> {
        match self.rejection_reason(date) {
            None => Ok(()),
            Some(reason) => Err(SchoolDeskError::Validation(format!(
                "Lesson date {} {} ({})",
                date, reason, self.year
            ))),
        }
    }

    /// Check the range invariants
    pub fn validate(&self) -> Result<()> {
        validate_ranges(
            self.academic_year_start,
            self.academic_year_end,
            self.vacation_start,
            self.vacation_end,
        )
    }

    /// Number of lesson days in the academic year
    pub fn permitted_days(&self) -> usize {
        self.academic_year_start
            .iter_days()
            .take_while(|day| *day <= self.academic_year_end)
            .filter(|day| self.is_date_permitted(*day))
            .count()
    }
}

/// Start must not come after end, for both the academic year and the vacation
pub fn validate_ranges(
    academic_year_start: NaiveDate,
    academic_year_end: NaiveDate,
    vacation_start: NaiveDate,
    vacation_end: NaiveDate,
) -> Result<()> {
    if academic_year_start > academic_year_end {
        return Err(SchoolDeskError::Validation(format!(
            "Academic year start {} is after its end {}",
            academic_year_start, academic_year_end
        )));
    }
    if vacation_start > vacation_end {
        return Err(SchoolDeskError::Validation(format!(
            "Vacation start {} is after its end {}",
            vacation_start, vacation_end
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCalendarRequest {
    pub year: i32,
    pub academic_year_start: NaiveDate,
    pub academic_year_end: NaiveDate,
    pub vacation_start: NaiveDate,
    pub vacation_end: NaiveDate,
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}

impl CreateCalendarRequest {
    pub fn validate(&self) -> Result<()> {
        validate_ranges(
            self.academic_year_start,
            self.academic_year_end,
            self.vacation_start,
            self.vacation_end,
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCalendarRequest {
    pub year: Option<i32>,
    pub academic_year_start: Option<NaiveDate>,
    pub academic_year_end: Option<NaiveDate>,
    pub vacation_start: Option<NaiveDate>,
    pub vacation_end: Option<NaiveDate>,
    pub holidays: Option<Vec<NaiveDate>>,
}

impl UpdateCalendarRequest {
    /// The calendar as it would be after applying this update
    pub fn apply_to(&self, calendar: &AcademicCalendar) -> AcademicCalendar {
        AcademicCalendar {
            id: calendar.id,
            year: self.year.unwrap_or(calendar.year),
            academic_year_start: self.academic_year_start.unwrap_or(calendar.academic_year_start),
            academic_year_end: self.academic_year_end.unwrap_or(calendar.academic_year_end),
            vacation_start: self.vacation_start.unwrap_or(calendar.vacation_start),
            vacation_end: self.vacation_end.unwrap_or(calendar.vacation_end),
            holidays: self.holidays.clone().unwrap_or_else(|| calendar.holidays.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar_2024() -> AcademicCalendar {
        AcademicCalendar {
            id: 1,
            year: 2024,
            academic_year_start: date(2024, 2, 5),
            academic_year_end: date(2024, 12, 13),
            vacation_start: date(2024, 7, 1),
            vacation_end: date(2024, 7, 31),
            holidays: vec![date(2024, 4, 21), date(2024, 9, 7), date(2024, 11, 15)],
        }
    }

    #[test]
    fn test_regular_school_day_is_permitted() {
        let calendar = calendar_2024();
        assert!(calendar.is_date_permitted(date(2024, 3, 12)));
        assert!(calendar.check_date(date(2024, 3, 12)).is_ok());
    }

    #[test]
    fn test_academic_year_bounds_are_inclusive() {
        let calendar = calendar_2024();
        assert!(calendar.is_date_permitted(date(2024, 2, 5)));
        assert!(calendar.is_date_permitted(date(2024, 12, 13)));
        assert_eq!(calendar.rejection_reason(date(2024, 2, 4)), Some(DateRejection::BeforeAcademicYear));
        assert_eq!(calendar.rejection_reason(date(2024, 12, 14)), Some(DateRejection::AfterAcademicYear));
    }

    #[test]
    fn test_vacation_bounds_are_rejected() {
        let calendar = calendar_2024();
        assert_eq!(calendar.rejection_reason(date(2024, 7, 1)), Some(DateRejection::DuringVacation));
        assert_eq!(calendar.rejection_reason(date(2024, 7, 31)), Some(DateRejection::DuringVacation));
        assert!(calendar.is_date_permitted(date(2024, 6, 30)));
        assert!(calendar.is_date_permitted(date(2024, 8, 1)));
    }

    #[test]
    fn test_holidays_are_rejected() {
        let calendar = calendar_2024();
        assert_eq!(calendar.rejection_reason(date(2024, 9, 7)), Some(DateRejection::Holiday));
        assert_matches!(
            calendar.check_date(date(2024, 11, 15)),
            Err(SchoolDeskError::Validation(msg)) if msg.contains("holiday")
        );
    }

    #[test]
    fn test_validate_rejects_inverted_ranges() {
        let mut calendar = calendar_2024();
        assert!(calendar.validate().is_ok());

        calendar.vacation_end = date(2024, 6, 1);
        assert_matches!(calendar.validate(), Err(SchoolDeskError::Validation(msg)) if msg.starts_with("Vacation"));

        calendar = calendar_2024();
        calendar.academic_year_end = date(2024, 1, 1);
        assert_matches!(calendar.validate(), Err(SchoolDeskError::Validation(msg)) if msg.starts_with("Academic"));
    }

    #[test]
    fn test_single_day_ranges_are_valid() {
        assert!(validate_ranges(date(2024, 3, 1), date(2024, 3, 1), date(2024, 7, 1), date(2024, 7, 1)).is_ok());
    }

    #[test]
    fn test_update_applies_over_existing() {
        let calendar = calendar_2024();
        let update = UpdateCalendarRequest {
            vacation_end: Some(date(2024, 7, 20)),
            holidays: Some(vec![]),
            ..Default::default()
        };
        let updated = update.apply_to(&calendar);
        assert_eq!(updated.vacation_start, calendar.vacation_start);
        assert_eq!(updated.vacation_end, date(2024, 7, 20));
        assert!(updated.holidays.is_empty());
        assert!(updated.is_date_permitted(date(2024, 9, 7)));
    }

    #[test]
    fn test_permitted_days_excludes_vacation_and_holidays() {
        let calendar = AcademicCalendar {
            id: 2,
            year: 2025,
            academic_year_start: date(2025, 3, 1),
            academic_year_end: date(2025, 3, 10),
            vacation_start: date(2025, 3, 4),
            vacation_end: date(2025, 3, 5),
            holidays: vec![date(2025, 3, 8)],
        };
        assert_eq!(calendar.permitted_days(), 7);
    }

    fn day_offset(offset: i64) -> NaiveDate {
        date(2024, 1, 1) + chrono::Duration::days(offset)
    }

    proptest! {
        #[test]
        fn prop_inside_year_and_outside_exclusions_is_permitted(offset in 35i64..=347) {
            let calendar = calendar_2024();
            let day = day_offset(offset);
            let in_vacation = calendar.vacation_start <= day && day <= calendar.vacation_end;
            let is_holiday = calendar.holidays.contains(&day);
            prop_assert_eq!(calendar.is_date_permitted(day), !in_vacation && !is_holiday);
        }

        #[test]
        fn prop_outside_year_is_rejected(offset in 0i64..35, after in 348i64..700) {
            let calendar = calendar_2024();
            prop_assert!(!calendar.is_date_permitted(day_offset(offset)));
            prop_assert!(!calendar.is_date_permitted(day_offset(after)));
        }

        #[test]
        fn prop_vacation_is_rejected(offset in 0i64..31) {
            let calendar = calendar_2024();
            let day = calendar.vacation_start + chrono::Duration::days(offset);
            prop_assert!(!calendar.is_date_permitted(day));
        }

        #[test]
        fn prop_any_listed_holiday_is_rejected(offset in 35i64..=347) {
            let mut calendar = calendar_2024();
            let day = day_offset(offset);
            calendar.holidays.push(day);
            prop_assert!(!calendar.is_date_permitted(day));
        }
    }
}
