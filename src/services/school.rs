//! School service implementation
//!
//! Schools, their members, subjects and classes, plus the enrollment links
//! between them.

use tracing::{info, warn, debug};
use crate::database::DatabaseService;
use crate::models::class::{Class, ClassType, CreateClassRequest, CreateClassTypeRequest, UpdateClassRequest};
use crate::models::member::{MemberKind, SchoolMember, CreateMemberRequest, UpdateMemberRequest};
use crate::models::school::{School, CreateSchoolRequest, UpdateSchoolRequest};
use crate::models::subject::{Subject, CreateSubjectRequest, UpdateSubjectRequest};
use crate::utils::errors::{SchoolDeskError, Result};
use crate::utils::helpers::normalize_whitespace;

fn require_text(field: &str, value: &str) -> Result<String> {
    let value = normalize_whitespace(value);
    if value.is_empty() {
        return Err(SchoolDeskError::Validation(format!("The {} field may not be blank", field)));
    }
    Ok(value)
}

fn check_hours(required_hours: Option<i32>, hours_taught: Option<i32>) -> Result<()> {
    if required_hours.is_some_and(|h| h < 0) || hours_taught.is_some_and(|h| h < 0) {
        return Err(SchoolDeskError::Validation("Hours may not be negative".to_string()));
    }
    Ok(())
}

/// School service for managing schools and what belongs to them
#[derive(Clone)]
#[derive(Debug)]
pub struct SchoolService {
    db: DatabaseService,
}

impl SchoolService {
    /// Create a new SchoolService instance
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Create a school
    pub async fn create_school(&self, mut request: CreateSchoolRequest) -> Result<School> {
        request.name = require_text("name", &request.name)?;
        request.address = require_text("address", &request.address)?;

        let school = self.db.schools.create(request).await?;
        info!(school_id = school.id, name = %school.name, school_type = %school.school_type, "School created");
        Ok(school)
    }

    pub async fn get_school(&self, school_id: i64) -> Result<School> {
        self.db.schools.find_by_id(school_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("School", school_id))
    }

    /// Update a school
    pub async fn update_school(&self, school_id: i64, mut request: UpdateSchoolRequest) -> Result<School> {
        if let Some(name) = request.name.as_deref() {
            request.name = Some(require_text("name", name)?);
        }
        if let Some(address) = request.address.as_deref() {
            request.address = Some(require_text("address", address)?);
        }

        let school = self.db.schools.update(school_id, request).await?;
        info!(school_id = school.id, "School updated");
        Ok(school)
    }

    /// Delete a school and everything that belongs to it
    pub async fn delete_school(&self, school_id: i64) -> Result<()> {
        if !self.db.schools.delete(school_id).await? {
            return Err(SchoolDeskError::not_found("School", school_id));
        }

        info!(school_id = school_id, "School deleted");
        Ok(())
    }

    /// Bind a user account to a school as a director, secretary, teacher or student
    pub async fn add_member(&self, kind: MemberKind, request: CreateMemberRequest) -> Result<SchoolMember> {
        debug!(kind = ?kind, user_id = request.user_id, school_id = request.school_id, "Adding school member");

        let user = self.db.users.find_by_id(request.user_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("User", request.user_id))?;
        if user.role != kind.user_role() {
            warn!(
                user_id = user.id,
                role = ?user.role,
                kind = ?kind,
                "Account role does not match membership kind"
            );
        }

        let member = self.db.members.create(kind, request).await?;
        info!(kind = ?kind, member_id = member.id, school_id = member.school_id, "School member added");
        Ok(member)
    }

    pub async fn get_member(&self, kind: MemberKind, member_id: i64) -> Result<SchoolMember> {
        self.db.members.find_by_id(kind, member_id).await?
            .ok_or_else(|| SchoolDeskError::not_found(kind.entity_name(), member_id))
    }

    /// Move a member to another school
    pub async fn update_member(&self, kind: MemberKind, member_id: i64, request: UpdateMemberRequest) -> Result<SchoolMember> {
        let member = self.db.members.update(kind, member_id, request).await?;
        info!(kind = ?kind, member_id = member.id, school_id = member.school_id, "School member updated");
        Ok(member)
    }

    /// Remove a member; the user account is kept
    pub async fn remove_member(&self, kind: MemberKind, member_id: i64) -> Result<()> {
        if !self.db.members.delete(kind, member_id).await? {
            return Err(SchoolDeskError::not_found(kind.entity_name(), member_id));
        }

        info!(kind = ?kind, member_id = member_id, "School member removed");
        Ok(())
    }

    /// Create a subject
    pub async fn create_subject(&self, mut request: CreateSubjectRequest) -> Result<Subject> {
        request.name = require_text("name", &request.name)?;
        request.code = require_text("code", &request.code)?;
        check_hours(Some(request.required_hours), Some(request.hours_taught))?;

        let subject = self.db.subjects.create(request).await?;
        info!(subject_id = subject.id, school_id = subject.school_id, code = %subject.code, "Subject created");
        Ok(subject)
    }

    pub async fn get_subject(&self, subject_id: i64) -> Result<Subject> {
        self.db.subjects.find_by_id(subject_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("Subject", subject_id))
    }

    /// Update a subject
    pub async fn update_subject(&self, subject_id: i64, mut request: UpdateSubjectRequest) -> Result<Subject> {
        if let Some(name) = request.name.as_deref() {
            request.name = Some(require_text("name", name)?);
        }
        if let Some(code) = request.code.as_deref() {
            request.code = Some(require_text("code", code)?);
        }
        check_hours(request.required_hours, request.hours_taught)?;

        let subject = self.db.subjects.update(subject_id, request).await?;
        info!(subject_id = subject.id, "Subject updated");
        Ok(subject)
    }

    /// Delete a subject together with its records
    pub async fn delete_subject(&self, subject_id: i64) -> Result<()> {
        if !self.db.subjects.delete(subject_id).await? {
            return Err(SchoolDeskError::not_found("Subject", subject_id));
        }

        info!(subject_id = subject_id, "Subject deleted");
        Ok(())
    }

    /// Assign a teacher to a subject
    pub async fn assign_teacher(&self, subject_id: i64, teacher_id: i64) -> Result<()> {
        self.get_subject(subject_id).await?;
        self.get_member(MemberKind::Teacher, teacher_id).await?;
        self.db.subjects.add_teacher(subject_id, teacher_id).await?;
        info!(subject_id = subject_id, teacher_id = teacher_id, "Teacher assigned to subject");
        Ok(())
    }

    pub async fn unassign_teacher(&self, subject_id: i64, teacher_id: i64) -> Result<bool> {
        self.db.subjects.remove_teacher(subject_id, teacher_id).await
    }

    /// Enroll a student in a subject
    pub async fn enroll_in_subject(&self, subject_id: i64, student_id: i64) -> Result<()> {
        self.get_subject(subject_id).await?;
        self.get_member(MemberKind::Student, student_id).await?;
        self.db.subjects.add_student(subject_id, student_id).await?;
        info!(subject_id = subject_id, student_id = student_id, "Student enrolled in subject");
        Ok(())
    }

    pub async fn withdraw_from_subject(&self, subject_id: i64, student_id: i64) -> Result<bool> {
        self.db.subjects.remove_student(subject_id, student_id).await
    }

    /// Create a class type
    pub async fn create_class_type(&self, request: CreateClassTypeRequest) -> Result<ClassType> {
        let name = require_text("name", &request.name)?;
        let class_type = self.db.classes.create_type(CreateClassTypeRequest { name }).await?;
        info!(class_type_id = class_type.id, name = %class_type.name, "Class type created");
        Ok(class_type)
    }

    pub async fn get_class_type(&self, class_type_id: i64) -> Result<ClassType> {
        self.db.classes.find_type_by_id(class_type_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("ClassType", class_type_id))
    }

    /// Rename a class type
    pub async fn rename_class_type(&self, class_type_id: i64, name: &str) -> Result<ClassType> {
        let name = require_text("name", name)?;
        self.db.classes.rename_type(class_type_id, &name).await
    }

    /// Delete a class type together with its classes
    pub async fn delete_class_type(&self, class_type_id: i64) -> Result<()> {
        if !self.db.classes.delete_type(class_type_id).await? {
            return Err(SchoolDeskError::not_found("ClassType", class_type_id));
        }

        info!(class_type_id = class_type_id, "Class type deleted");
        Ok(())
    }

    /// Create a class
    pub async fn create_class(&self, mut request: CreateClassRequest) -> Result<Class> {
        request.code = require_text("code", &request.code)?;

        let class = self.db.classes.create(request).await?;
        info!(class_id = class.id, school_id = class.school_id, code = %class.code, "Class created");
        Ok(class)
    }

    pub async fn get_class(&self, class_id: i64) -> Result<Class> {
        self.db.classes.find_by_id(class_id).await?
            .ok_or_else(|| SchoolDeskError::not_found("Class", class_id))
    }

    /// Update a class
    pub async fn update_class(&self, class_id: i64, mut request: UpdateClassRequest) -> Result<Class> {
        if let Some(code) = request.code.as_deref() {
            request.code = Some(require_text("code", code)?);
        }

        let class = self.db.classes.update(class_id, request).await?;
        info!(class_id = class.id, "Class updated");
        Ok(class)
    }

    /// Delete a class
    pub async fn delete_class(&self, class_id: i64) -> Result<()> {
        if !self.db.classes.delete(class_id).await? {
            return Err(SchoolDeskError::not_found("Class", class_id));
        }

        info!(class_id = class_id, "Class deleted");
        Ok(())
    }

    /// Put a student in a class
    pub async fn add_student_to_class(&self, class_id: i64, student_id: i64) -> Result<()> {
        self.get_class(class_id).await?;
        self.get_member(MemberKind::Student, student_id).await?;
        self.db.classes.add_student(class_id, student_id).await?;
        info!(class_id = class_id, student_id = student_id, "Student added to class");
        Ok(())
    }

    pub async fn remove_student_from_class(&self, class_id: i64, student_id: i64) -> Result<bool> {
        self.db.classes.remove_student(class_id, student_id).await
    }

    /// Add a subject to a class's curriculum
    pub async fn add_subject_to_class(&self, class_id: i64, subject_id: i64) -> Result<()> {
        self.get_class(class_id).await?;
        self.get_subject(subject_id).await?;
        self.db.classes.add_subject(class_id, subject_id).await?;
        info!(class_id = class_id, subject_id = subject_id, "Subject added to class");
        Ok(())
    }

    pub async fn remove_subject_from_class(&self, class_id: i64, subject_id: i64) -> Result<bool> {
        self.db.classes.remove_subject(class_id, subject_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("name", "  Escola   Central ").unwrap(), "Escola Central");
        assert_matches!(require_text("name", "   "), Err(SchoolDeskError::Validation(_)));
    }

    #[test]
    fn test_negative_hours_rejected() {
        assert!(check_hours(Some(80), Some(0)).is_ok());
        assert!(check_hours(None, None).is_ok());
        assert_matches!(check_hours(Some(-1), None), Err(SchoolDeskError::Validation(_)));
        assert_matches!(check_hours(None, Some(-5)), Err(SchoolDeskError::Validation(_)));
    }
}
