//! Test data helpers for creating test records
//!
//! Names and addresses are generated with `fake`; usernames and codes carry a
//! random suffix so fixtures never collide on unique columns.

use chrono::NaiveDate;
use fake::faker::address::en::StreetName;
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use SchoolDesk::models::*;
use SchoolDesk::services::ServiceFactory;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

fn suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// An account request with a generated name and the given role
pub fn user_request(role: Option<UserRole>) -> CreateUserRequest {
    let first_name: String = FirstName().fake();
    CreateUserRequest {
        username: format!("{}_{}", first_name.to_lowercase().replace(|c: char| !c.is_ascii_alphanumeric(), ""), suffix()),
        email: Some(SafeEmail().fake()),
        password: Some("correct horse battery".to_string()),
        first_name: Some(first_name),
        last_name: Some(LastName().fake()),
        role,
        ..Default::default()
    }
}

/// The 2024 school year: Feb 5 to Dec 13, July off, three holidays
pub fn calendar_2024() -> CreateCalendarRequest {
    CreateCalendarRequest {
        year: 2024,
        academic_year_start: date(2024, 2, 5),
        academic_year_end: date(2024, 12, 13),
        vacation_start: date(2024, 7, 1),
        vacation_end: date(2024, 7, 31),
        holidays: vec![date(2024, 4, 21), date(2024, 9, 7), date(2024, 11, 15)],
    }
}

pub fn school_request(calendar_id: Option<i64>) -> CreateSchoolRequest {
    CreateSchoolRequest {
        name: format!("{} School", CompanyName().fake::<String>()),
        address: StreetName().fake(),
        school_type: SchoolType::Elementary,
        calendar_id,
    }
}

/// A school with a calendar, one member of each kind, a subject and a class
pub struct SeededSchool {
    pub calendar: AcademicCalendar,
    pub school: School,
    pub director: SchoolMember,
    pub secretary: SchoolMember,
    pub teacher: SchoolMember,
    pub student: SchoolMember,
    pub subject: Subject,
    pub class: Class,
}

pub async fn add_member(services: &ServiceFactory, kind: MemberKind, school_id: i64) -> SchoolMember {
    let user = services
        .user_service
        .create_user(user_request(Some(kind.user_role())))
        .await
        .expect("create user");
    services
        .school_service
        .add_member(kind, CreateMemberRequest { user_id: user.id, school_id })
        .await
        .expect("add member")
}

pub async fn seed_school(services: &ServiceFactory) -> SeededSchool {
    let calendar = services
        .calendar_service
        .create_calendar(calendar_2024())
        .await
        .expect("create calendar");
    let school = services
        .school_service
        .create_school(school_request(Some(calendar.id)))
        .await
        .expect("create school");

    let director = add_member(services, MemberKind::Director, school.id).await;
    let secretary = add_member(services, MemberKind::Secretary, school.id).await;
    let teacher = add_member(services, MemberKind::Teacher, school.id).await;
    let student = add_member(services, MemberKind::Student, school.id).await;

    let subject = services
        .school_service
        .create_subject(CreateSubjectRequest {
            name: "Mathematics".to_string(),
            school_id: school.id,
            shift: Shift::Morning,
            required_hours: 80,
            hours_taught: 0,
            year: 2024,
            code: format!("MAT-{}", suffix()),
        })
        .await
        .expect("create subject");

    let class_type = services
        .school_service
        .create_class_type(CreateClassTypeRequest { name: format!("Regular {}", suffix()) })
        .await
        .expect("create class type");
    let class = services
        .school_service
        .create_class(CreateClassRequest {
            class_type_id: class_type.id,
            school_id: school.id,
            year: 2024,
            code: format!("5A-{}", suffix()),
        })
        .await
        .expect("create class");

    services.school_service.assign_teacher(subject.id, teacher.id).await.expect("assign teacher");
    services.school_service.enroll_in_subject(subject.id, student.id).await.expect("enroll");
    services.school_service.add_student_to_class(class.id, student.id).await.expect("add to class");
    services.school_service.add_subject_to_class(class.id, subject.id).await.expect("add subject");

    let school = services.school_service.get_school(school.id).await.expect("reload school");

    SeededSchool {
        calendar,
        school,
        director,
        secretary,
        teacher,
        student,
        subject,
        class,
    }
}
