//! Admin registry
//!
//! Every entity is registered once with the columns its list view shows,
//! the fields searched by `q`, the columns that accept exact-match filters
//! and the default ordering. Only names listed here ever reach SQL.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::AdminConfig;
use crate::database::TableQuery;
use crate::models::member::{MemberKind, Permission};
use crate::utils::errors::{Result, SchoolDeskError};
use crate::utils::helpers::calculate_offset;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Users,
    Schools,
    Directors,
    Secretaries,
    Teachers,
    Students,
    Subjects,
    ClassTypes,
    Classes,
    AcademicCalendars,
    LessonRecords,
    AbsenceRecords,
    GradeRecords,
}

impl Entity {
    /// The membership table this entity maps to, if it is one
    pub fn member_kind(&self) -> Option<MemberKind> {
        match self {
            Entity::Directors => Some(MemberKind::Director),
            Entity::Secretaries => Some(MemberKind::Secretary),
            Entity::Teachers => Some(MemberKind::Teacher),
            Entity::Students => Some(MemberKind::Student),
            _ => None,
        }
    }
}

/// How one entity is presented and guarded in the admin
#[derive(Debug, Clone, Serialize)]
pub struct ModelAdmin {
    pub entity: Entity,
    pub slug: &'static str,
    #[serde(skip)]
    pub table: &'static str,
    pub verbose_name: &'static str,
    pub verbose_name_plural: &'static str,
    /// Columns returned by the detail view
    #[serde(skip)]
    pub columns: &'static [&'static str],
    pub list_display: &'static [&'static str],
    pub search_fields: &'static [&'static str],
    pub list_filter: &'static [&'static str],
    pub ordering: &'static [&'static str],
    /// Link collections editable through `/{slug}/{id}/{relation}/{related_id}`
    pub relations: &'static [&'static str],
    /// Needed to create, update or delete; reading only needs staff status
    pub write_permission: Permission,
}

const MEMBER_COLUMNS: &[&str] = &["id", "user_id", "school_id"];

fn member_admin(
    entity: Entity,
    slug: &'static str,
    verbose_name: &'static str,
    verbose_name_plural: &'static str,
    write_permission: Permission,
) -> ModelAdmin {
    ModelAdmin {
        entity,
        slug,
        table: slug,
        verbose_name,
        verbose_name_plural,
        columns: MEMBER_COLUMNS,
        list_display: MEMBER_COLUMNS,
        search_fields: &[],
        list_filter: &["school_id"],
        ordering: &["school_id"],
        relations: &[],
        write_permission,
    }
}

fn registered_models() -> Vec<ModelAdmin> {
    vec![
        ModelAdmin {
            entity: Entity::Users,
            slug: "users",
            table: "users",
            verbose_name: "user",
            verbose_name_plural: "users",
            columns: &[
                "id", "username", "email", "first_name", "last_name", "role", "is_staff",
                "is_superuser", "is_active", "date_joined", "last_login",
            ],
            list_display: &["id", "username", "email", "first_name", "last_name", "role", "is_staff"],
            search_fields: &["username", "first_name", "last_name", "email"],
            list_filter: &["role", "is_staff", "is_superuser", "is_active"],
            ordering: &["username"],
            relations: &[],
            write_permission: Permission::ManageStaff,
        },
        ModelAdmin {
            entity: Entity::Schools,
            slug: "schools",
            table: "schools",
            verbose_name: "school",
            verbose_name_plural: "schools",
            columns: &["id", "name", "address", "school_type", "director_id", "calendar_id"],
            list_display: &["id", "name", "school_type", "director_id", "calendar_id"],
            search_fields: &["name", "address"],
            list_filter: &["school_type"],
            ordering: &["name"],
            relations: &[],
            write_permission: Permission::ManageSchool,
        },
        member_admin(Entity::Directors, "directors", "director", "directors", Permission::ManageStaff),
        member_admin(Entity::Secretaries, "secretaries", "secretary", "secretaries", Permission::ManageStaff),
        member_admin(Entity::Teachers, "teachers", "teacher", "teachers", Permission::ManageStaff),
        member_admin(Entity::Students, "students", "student", "students", Permission::ManageStudents),
        ModelAdmin {
            entity: Entity::Subjects,
            slug: "subjects",
            table: "subjects",
            verbose_name: "subject",
            verbose_name_plural: "subjects",
            columns: &["id", "name", "school_id", "shift", "required_hours", "hours_taught", "year", "code"],
            list_display: &["id", "name", "code", "school_id", "shift", "year", "required_hours", "hours_taught"],
            search_fields: &["name", "code"],
            list_filter: &["school_id", "shift", "year"],
            ordering: &["-year", "name"],
            relations: &["teachers", "students"],
            write_permission: Permission::ManageSubjects,
        },
        ModelAdmin {
            entity: Entity::ClassTypes,
            slug: "class_types",
            table: "class_types",
            verbose_name: "class type",
            verbose_name_plural: "class types",
            columns: &["id", "name"],
            list_display: &["id", "name"],
            search_fields: &["name"],
            list_filter: &[],
            ordering: &["name"],
            relations: &[],
            write_permission: Permission::ManageClasses,
        },
        ModelAdmin {
            entity: Entity::Classes,
            slug: "classes",
            table: "classes",
            verbose_name: "class",
            verbose_name_plural: "classes",
            columns: &["id", "class_type_id", "school_id", "year", "code"],
            list_display: &["id", "code", "class_type_id", "school_id", "year"],
            search_fields: &["code"],
            list_filter: &["school_id", "class_type_id", "year"],
            ordering: &["-year", "code"],
            relations: &["students", "subjects"],
            write_permission: Permission::ManageClasses,
        },
        ModelAdmin {
            entity: Entity::AcademicCalendars,
            slug: "academic_calendars",
            table: "academic_calendars",
            verbose_name: "academic calendar",
            verbose_name_plural: "academic calendars",
            columns: &[
                "id", "year", "academic_year_start", "academic_year_end", "vacation_start",
                "vacation_end", "holidays",
            ],
            list_display: &[
                "year", "academic_year_start", "academic_year_end", "vacation_start", "vacation_end",
            ],
            search_fields: &[],
            list_filter: &["year"],
            ordering: &["-year"],
            relations: &[],
            write_permission: Permission::ManageCalendar,
        },
        ModelAdmin {
            entity: Entity::LessonRecords,
            slug: "lesson_records",
            table: "lesson_records",
            verbose_name: "lesson record",
            verbose_name_plural: "lesson records",
            columns: &["id", "subject_id", "lesson_date", "content"],
            list_display: &["id", "subject_id", "lesson_date", "content"],
            search_fields: &["content"],
            list_filter: &["subject_id", "lesson_date"],
            ordering: &["-lesson_date"],
            relations: &[],
            write_permission: Permission::RecordLessons,
        },
        ModelAdmin {
            entity: Entity::AbsenceRecords,
            slug: "absence_records",
            table: "absence_records",
            verbose_name: "absence record",
            verbose_name_plural: "absence records",
            columns: &["id", "student_id", "subject_id", "absence_date"],
            list_display: &["id", "student_id", "subject_id", "absence_date"],
            search_fields: &[],
            list_filter: &["student_id", "subject_id", "absence_date"],
            ordering: &["-absence_date"],
            relations: &[],
            write_permission: Permission::RecordAbsences,
        },
        ModelAdmin {
            entity: Entity::GradeRecords,
            slug: "grade_records",
            table: "grade_records",
            verbose_name: "grade record",
            verbose_name_plural: "grade records",
            columns: &["id", "student_id", "subject_id", "grade", "grade_date"],
            list_display: &["id", "student_id", "subject_id", "grade", "grade_date"],
            search_fields: &[],
            list_filter: &["student_id", "subject_id"],
            ordering: &["-grade_date"],
            relations: &[],
            write_permission: Permission::RecordGrades,
        },
    ]
}

/// List view parameters taken from the query string
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub search: Option<String>,
    pub page: usize,
    pub page_size: usize,
    pub offset: i64,
    pub filters: Vec<(String, String)>,
}

impl ListParams {
    /// Split a query string into search, paging and filters.
    ///
    /// `page` is 1-based; `page_size` is clamped to the configured maximum.
    pub fn from_query(mut query: HashMap<String, String>, config: &AdminConfig) -> Result<Self> {
        let page = match query.remove("page") {
            Some(page) => page
                .parse::<usize>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or_else(|| SchoolDeskError::InvalidInput(format!("Invalid page: {}", page)))?,
            None => 1,
        };

        let page_size = match query.remove("page_size") {
            Some(size) => size
                .parse::<usize>()
                .ok()
                .filter(|s| *s >= 1)
                .ok_or_else(|| SchoolDeskError::InvalidInput(format!("Invalid page_size: {}", size)))?
                .min(config.max_page_size),
            None => config.page_size,
        };

        let offset = calculate_offset(page, page_size)
            .ok_or_else(|| SchoolDeskError::InvalidInput(format!("Page out of range: {}", page)))?;

        let search = query.remove("q");
        let mut filters: Vec<(String, String)> = query.into_iter().collect();
        filters.sort();

        Ok(Self { search, page, page_size, offset, filters })
    }
}

impl ModelAdmin {
    /// Build the list query, rejecting filters on unregistered columns
    pub fn list_query<'a>(&self, params: &'a ListParams) -> Result<TableQuery<'a>> {
        let mut filters = Vec::with_capacity(params.filters.len());
        for (name, value) in &params.filters {
            let column = self
                .list_filter
                .iter()
                .find(|column| **column == name.as_str())
                .ok_or_else(|| {
                    SchoolDeskError::InvalidInput(format!("Cannot filter {} by {}", self.slug, name))
                })?;
            filters.push((*column, value.as_str()));
        }

        Ok(TableQuery {
            table: self.table,
            columns: self.list_display_with_id(),
            search_fields: self.search_fields,
            ordering: self.ordering,
            search: params.search.as_deref(),
            filters,
            limit: params.page_size as i64,
            offset: params.offset,
        })
    }

    /// List rows always carry `id` so they can be linked to their detail view
    fn list_display_with_id(&self) -> Vec<&'static str> {
        let mut columns = self.list_display.to_vec();
        if !columns.contains(&"id") {
            columns.insert(0, "id");
        }
        columns
    }

    pub fn has_relation(&self, relation: &str) -> bool {
        self.relations.contains(&relation)
    }
}

/// The set of registered entities
#[derive(Debug, Clone)]
pub struct AdminSite {
    models: Vec<ModelAdmin>,
}

impl Default for AdminSite {
    fn default() -> Self {
        Self { models: registered_models() }
    }
}

impl AdminSite {
    pub fn get(&self, slug: &str) -> Result<&ModelAdmin> {
        self.models
            .iter()
            .find(|model| model.slug == slug)
            .ok_or_else(|| SchoolDeskError::UnknownEntity(slug.to_string()))
    }

    pub fn models(&self) -> &[ModelAdmin] {
        &self.models
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn admin_config() -> AdminConfig {
        crate::config::Settings::default().admin
    }

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_every_entity_registered_once() {
        let site = AdminSite::default();
        assert_eq!(site.models().len(), 13);
        let slugs: std::collections::HashSet<_> = site.models().iter().map(|m| m.slug).collect();
        assert_eq!(slugs.len(), 13);
    }

    #[test]
    fn test_registered_columns_are_known() {
        for model in AdminSite::default().models() {
            for column in model.list_display.iter().chain(model.search_fields).chain(model.list_filter) {
                assert!(model.columns.contains(column), "{}.{} not in columns", model.slug, column);
            }
            for term in model.ordering {
                assert!(model.columns.contains(&term.trim_start_matches('-')));
            }
        }
    }

    #[test]
    fn test_calendar_list_display() {
        let site = AdminSite::default();
        let calendars = site.get("academic_calendars").unwrap();
        assert_eq!(
            calendars.list_display,
            &["year", "academic_year_start", "academic_year_end", "vacation_start", "vacation_end"]
        );
        assert_eq!(calendars.list_filter, &["year"]);
    }

    #[test]
    fn test_password_hash_never_listed() {
        let users = AdminSite::default();
        let users = users.get("users").unwrap();
        assert!(!users.columns.contains(&"password_hash"));
    }

    #[test]
    fn test_unknown_entity() {
        assert_matches!(AdminSite::default().get("grades"), Err(SchoolDeskError::UnknownEntity(_)));
    }

    #[test]
    fn test_list_params_paging() {
        let config = admin_config();
        let params = ListParams::from_query(query(&[("page", "3"), ("page_size", "100000"), ("q", "ana")]), &config).unwrap();
        assert_eq!(params.page, 3);
        assert_eq!(params.page_size, config.max_page_size);
        assert_eq!(params.search.as_deref(), Some("ana"));
        assert!(params.filters.is_empty());

        assert_matches!(ListParams::from_query(query(&[("page", "0")]), &config), Err(SchoolDeskError::InvalidInput(_)));
    }

    #[test]
    fn test_huge_page_is_rejected() {
        let config = admin_config();
        let huge = usize::MAX.to_string();
        assert_matches!(
            ListParams::from_query(query(&[("page", huge.as_str())]), &config),
            Err(SchoolDeskError::InvalidInput(_))
        );
        assert_matches!(
            ListParams::from_query(query(&[("page", "1152921504606846976")]), &config),
            Err(SchoolDeskError::InvalidInput(_))
        );

        let params = ListParams::from_query(query(&[("page", "4"), ("page_size", "10")]), &config).unwrap();
        assert_eq!(params.offset, 30);
    }

    #[test]
    fn test_list_query_rejects_unregistered_filter() {
        let site = AdminSite::default();
        let config = admin_config();
        let params = ListParams::from_query(query(&[("password_hash", "x")]), &config).unwrap();
        assert_matches!(site.get("users").unwrap().list_query(&params), Err(SchoolDeskError::InvalidInput(_)));

        let params = ListParams::from_query(query(&[("year", "2024"), ("page", "2")]), &config).unwrap();
        let table_query = site.get("academic_calendars").unwrap().list_query(&params).unwrap();
        assert_eq!(table_query.filters, vec![("year", "2024")]);
        assert_eq!(table_query.offset, config.page_size as i64);
        assert!(table_query.columns.contains(&"id"));
    }
}
