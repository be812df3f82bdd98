//! Typed create, update and delete per registered entity
//!
//! Request bodies are decoded into the entity's request type and handed to
//! its service, so every admin write passes the same validation as code
//! calling the services directly.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::admin::site::Entity;
use crate::models::class::CreateClassTypeRequest;
use crate::models::member::MemberKind;
use crate::services::ServiceFactory;
use crate::utils::errors::{Result, SchoolDeskError};

fn parse<T: DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body).map_err(|e| SchoolDeskError::InvalidInput(e.to_string()))
}

fn member_kind(entity: Entity) -> Result<MemberKind> {
    entity
        .member_kind()
        .ok_or_else(|| SchoolDeskError::InvalidInput(format!("{:?} is not a school membership", entity)))
}

fn to_json<T: Serialize>(record: T) -> Result<Value> {
    Ok(serde_json::to_value(record)?)
}

/// Returns the created record
pub async fn create(services: &ServiceFactory, entity: Entity, body: Value) -> Result<Value> {
    match entity {
        Entity::Users => to_json(services.user_service.create_user(parse(body)?).await?),
        Entity::Schools => to_json(services.school_service.create_school(parse(body)?).await?),
        Entity::Subjects => to_json(services.school_service.create_subject(parse(body)?).await?),
        Entity::ClassTypes => to_json(services.school_service.create_class_type(parse(body)?).await?),
        Entity::Classes => to_json(services.school_service.create_class(parse(body)?).await?),
        Entity::AcademicCalendars => to_json(services.calendar_service.create_calendar(parse(body)?).await?),
        Entity::LessonRecords => to_json(services.record_service.record_lesson(parse(body)?).await?),
        Entity::AbsenceRecords => to_json(services.record_service.record_absence(parse(body)?).await?),
        Entity::GradeRecords => to_json(services.record_service.record_grade(parse(body)?).await?),
        Entity::Directors | Entity::Secretaries | Entity::Teachers | Entity::Students => {
            let kind = member_kind(entity)?;
            to_json(services.school_service.add_member(kind, parse(body)?).await?)
        }
    }
}

/// Returns the updated record
pub async fn update(services: &ServiceFactory, entity: Entity, id: i64, body: Value) -> Result<Value> {
    match entity {
        Entity::Users => to_json(services.user_service.update_user(id, parse(body)?).await?),
        Entity::Schools => to_json(services.school_service.update_school(id, parse(body)?).await?),
        Entity::Subjects => to_json(services.school_service.update_subject(id, parse(body)?).await?),
        Entity::ClassTypes => {
            let request: CreateClassTypeRequest = parse(body)?;
            to_json(services.school_service.rename_class_type(id, &request.name).await?)
        }
        Entity::Classes => to_json(services.school_service.update_class(id, parse(body)?).await?),
        Entity::AcademicCalendars => to_json(services.calendar_service.update_calendar(id, parse(body)?).await?),
        Entity::LessonRecords => to_json(services.record_service.update_lesson(id, parse(body)?).await?),
        Entity::AbsenceRecords => to_json(services.record_service.update_absence(id, parse(body)?).await?),
        Entity::GradeRecords => to_json(services.record_service.update_grade(id, parse(body)?).await?),
        Entity::Directors | Entity::Secretaries | Entity::Teachers | Entity::Students => {
            let kind = member_kind(entity)?;
            to_json(services.school_service.update_member(kind, id, parse(body)?).await?)
        }
    }
}

pub async fn delete(services: &ServiceFactory, entity: Entity, id: i64) -> Result<()> {
    match entity {
        Entity::Users => services.user_service.delete_user(id).await,
        Entity::Schools => services.school_service.delete_school(id).await,
        Entity::Subjects => services.school_service.delete_subject(id).await,
        Entity::ClassTypes => services.school_service.delete_class_type(id).await,
        Entity::Classes => services.school_service.delete_class(id).await,
        Entity::AcademicCalendars => services.calendar_service.delete_calendar(id).await,
        Entity::LessonRecords => services.record_service.delete_lesson(id).await,
        Entity::AbsenceRecords => services.record_service.delete_absence(id).await,
        Entity::GradeRecords => services.record_service.delete_grade(id).await,
        Entity::Directors | Entity::Secretaries | Entity::Teachers | Entity::Students => {
            let kind = member_kind(entity)?;
            services.school_service.remove_member(kind, id).await
        }
    }
}

/// Add a many-to-many link such as a teacher assigned to a subject
pub async fn link(services: &ServiceFactory, entity: Entity, id: i64, relation: &str, related_id: i64) -> Result<()> {
    let schools = &services.school_service;
    match (entity, relation) {
        (Entity::Subjects, "teachers") => schools.assign_teacher(id, related_id).await,
        (Entity::Subjects, "students") => schools.enroll_in_subject(id, related_id).await,
        (Entity::Classes, "students") => schools.add_student_to_class(id, related_id).await,
        (Entity::Classes, "subjects") => schools.add_subject_to_class(id, related_id).await,
        _ => Err(unknown_relation(entity, relation)),
    }
}

/// Remove a many-to-many link; missing links are reported as not found
pub async fn unlink(services: &ServiceFactory, entity: Entity, id: i64, relation: &str, related_id: i64) -> Result<()> {
    let schools = &services.school_service;
    let removed = match (entity, relation) {
        (Entity::Subjects, "teachers") => schools.unassign_teacher(id, related_id).await?,
        (Entity::Subjects, "students") => schools.withdraw_from_subject(id, related_id).await?,
        (Entity::Classes, "students") => schools.remove_student_from_class(id, related_id).await?,
        (Entity::Classes, "subjects") => schools.remove_subject_from_class(id, related_id).await?,
        _ => return Err(unknown_relation(entity, relation)),
    };

    if removed {
        Ok(())
    } else {
        Err(SchoolDeskError::not_found("Link", related_id))
    }
}

fn unknown_relation(entity: Entity, relation: &str) -> SchoolDeskError {
    SchoolDeskError::InvalidInput(format!("{:?} has no relation {}", entity, relation))
}
