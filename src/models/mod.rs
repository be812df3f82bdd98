//! Data models module
//!
//! This module contains all data structures used throughout the application

/// Implements string storage for a unit-only enum.
///
/// The enum is stored in a VARCHAR column using the names given here, and
/// serde uses the same names.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::utils::errors::SchoolDeskError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(crate::utils::errors::SchoolDeskError::InvalidInput(
                        format!("Unknown {} value: {}", stringify!($name), other)
                    )),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> std::result::Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<'r, sqlx::Postgres>>::decode(value)?;
                Ok(text.parse()?)
            }
        }
    };
}

pub(crate) use text_enum;

/// Deserializer for `Option<Option<T>>` fields that tells an explicit
/// `null` (`Some(None)`) apart from a missing key (`None`, via `#[serde(default)]`).
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    <Option<T> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

pub mod user;
pub mod school;
pub mod member;
pub mod subject;
pub mod class;
pub mod calendar;
pub mod records;

// Re-export commonly used models
pub use user::{User, UserRole, CreateUserRequest, UpdateUserRequest};
pub use school::{School, SchoolType, CreateSchoolRequest, UpdateSchoolRequest};
pub use member::{SchoolMember, MemberKind, Permission, CreateMemberRequest, UpdateMemberRequest};
pub use subject::{Subject, Shift, CreateSubjectRequest, UpdateSubjectRequest};
pub use class::{ClassType, Class, CreateClassTypeRequest, CreateClassRequest, UpdateClassRequest};
pub use calendar::{AcademicCalendar, DateRejection, CreateCalendarRequest, UpdateCalendarRequest};
pub use records::{
    LessonRecord, AbsenceRecord, GradeRecord, CreateLessonRequest, UpdateLessonRequest,
    CreateAbsenceRequest, UpdateAbsenceRequest, CreateGradeRequest, UpdateGradeRequest,
};
