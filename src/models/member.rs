//! School membership models
//!
//! Directors, secretaries, teachers and students all bind one user account to
//! one school. They live in separate tables but share the same shape, so a
//! single row type is used together with a `MemberKind` naming the table.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::user::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Director,
    Secretary,
    Teacher,
    Student,
}

/// Operations a member may perform on their school's records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageSchool,
    ManageCalendar,
    ManageStaff,
    ManageStudents,
    ManageSubjects,
    ManageClasses,
    RecordLessons,
    RecordAbsences,
    RecordGrades,
    ViewRecords,
}

impl MemberKind {
    pub const ALL: &'static [MemberKind] = &[
        MemberKind::Director,
        MemberKind::Secretary,
        MemberKind::Teacher,
        MemberKind::Student,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            MemberKind::Director => "directors",
            MemberKind::Secretary => "secretaries",
            MemberKind::Teacher => "teachers",
            MemberKind::Student => "students",
        }
    }

    pub fn entity_name(&self) -> &'static str {
        match self {
            MemberKind::Director => "Director",
            MemberKind::Secretary => "Secretary",
            MemberKind::Teacher => "Teacher",
            MemberKind::Student => "Student",
        }
    }

    /// The account role that matches this membership
    pub fn user_role(&self) -> UserRole {
        match self {
            MemberKind::Director => UserRole::Director,
            MemberKind::Secretary => UserRole::Secretary,
            MemberKind::Teacher => UserRole::Teacher,
            MemberKind::Student => UserRole::Student,
        }
    }

    pub fn from_role(role: UserRole) -> Self {
        match role {
            UserRole::Director => MemberKind::Director,
            UserRole::Secretary => MemberKind::Secretary,
            UserRole::Teacher => MemberKind::Teacher,
            UserRole::Student => MemberKind::Student,
        }
    }

    pub fn permissions(&self) -> HashSet<Permission> {
        use Permission::*;

        let granted: &[Permission] = match self {
            MemberKind::Director => &[
                ManageSchool, ManageCalendar, ManageStaff, ManageStudents, ManageSubjects,
                ManageClasses, RecordLessons, RecordAbsences, RecordGrades, ViewRecords,
            ],
            MemberKind::Secretary => &[
                ManageCalendar, ManageStudents, ManageSubjects, ManageClasses, RecordAbsences,
                ViewRecords,
            ],
            MemberKind::Teacher => &[RecordLessons, RecordAbsences, RecordGrades, ViewRecords],
            MemberKind::Student => &[ViewRecords],
        };

        granted.iter().copied().collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SchoolMember {
    pub id: i64,
    pub user_id: i64,
    pub school_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemberRequest {
    pub user_id: i64,
    pub school_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMemberRequest {
    pub school_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for kind in MemberKind::ALL {
            assert_eq!(MemberKind::from_role(kind.user_role()), *kind);
        }
    }

    #[test]
    fn test_director_has_every_permission() {
        let director = MemberKind::Director.permissions();
        for kind in MemberKind::ALL {
            assert!(kind.permissions().is_subset(&director));
        }
    }

    #[test]
    fn test_teacher_records_but_does_not_manage() {
        let teacher = MemberKind::Teacher.permissions();
        assert!(teacher.contains(&Permission::RecordLessons));
        assert!(teacher.contains(&Permission::RecordGrades));
        assert!(!teacher.contains(&Permission::ManageStaff));
        assert_eq!(MemberKind::Student.permissions().len(), 1);
    }
}
