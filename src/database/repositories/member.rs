//! School membership repository implementation
//!
//! One repository serves the directors, secretaries, teachers and students
//! tables; every call names the table through a `MemberKind`.

use sqlx::PgPool;
use crate::models::member::{SchoolMember, MemberKind, CreateMemberRequest, UpdateMemberRequest};
use crate::utils::errors::SchoolDeskError;

#[derive(Clone)]
#[derive(Debug)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new membership.
    ///
    /// A director is also recorded on the school itself, in the same transaction.
    pub async fn create(&self, kind: MemberKind, request: CreateMemberRequest) -> Result<SchoolMember, SchoolDeskError> {
        let mut tx = self.pool.begin().await?;

        let member = sqlx::query_as::<_, SchoolMember>(&format!(
            "INSERT INTO {} (user_id, school_id) VALUES ($1, $2) RETURNING id, user_id, school_id",
            kind.table()
        ))
        .bind(request.user_id)
        .bind(request.school_id)
        .fetch_one(&mut *tx)
        .await?;

        if kind == MemberKind::Director {
            sqlx::query("UPDATE schools SET director_id = $2 WHERE id = $1")
                .bind(member.school_id)
                .bind(member.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(member)
    }

    /// Find membership by ID
    pub async fn find_by_id(&self, kind: MemberKind, id: i64) -> Result<Option<SchoolMember>, SchoolDeskError> {
        let member = sqlx::query_as::<_, SchoolMember>(&format!(
            "SELECT id, user_id, school_id FROM {} WHERE id = $1",
            kind.table()
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Move a membership to another school
    pub async fn update(&self, kind: MemberKind, id: i64, request: UpdateMemberRequest) -> Result<SchoolMember, SchoolDeskError> {
        let mut tx = self.pool.begin().await?;

        let member = sqlx::query_as::<_, SchoolMember>(&format!(
            "UPDATE {} SET school_id = COALESCE($2, school_id) WHERE id = $1 RETURNING id, user_id, school_id",
            kind.table()
        ))
        .bind(id)
        .bind(request.school_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| SchoolDeskError::not_found(kind.entity_name(), id))?;

        if kind == MemberKind::Director {
            sqlx::query("UPDATE schools SET director_id = NULL WHERE director_id = $1 AND id <> $2")
                .bind(member.id)
                .bind(member.school_id)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE schools SET director_id = $2 WHERE id = $1")
                .bind(member.school_id)
                .bind(member.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(member)
    }

    /// Delete membership.
    ///
    /// Deleting a director leaves the school in place with no director.
    pub async fn delete(&self, kind: MemberKind, id: i64) -> Result<bool, SchoolDeskError> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", kind.table()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Members of one kind belonging to a school
    pub async fn list_for_school(&self, kind: MemberKind, school_id: i64) -> Result<Vec<SchoolMember>, SchoolDeskError> {
        let members = sqlx::query_as::<_, SchoolMember>(&format!(
            "SELECT id, user_id, school_id FROM {} WHERE school_id = $1 ORDER BY id ASC",
            kind.table()
        ))
        .bind(school_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
