//! Repository for the `users` table.

use sqlx::PgPool;
use syncdesk_core::roles::Role;
use syncdesk_core::types::{DbId, Timestamp};

use crate::models::user::{CreateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, phone, role, school_id, name, email, \
                        restricted_to_admin_until, ticket_creation_blocked_until, created_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (phone, role, school_id, name, email)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.phone)
            .bind(input.role.as_str())
            .bind(input.school_id)
            .bind(&input.name)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by phone number.
    pub async fn find_by_phone(pool: &PgPool, phone: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE phone = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(phone)
            .fetch_optional(pool)
            .await
    }

    /// Change a user's role (auth-service role correction on stub logins).
    pub async fn set_role(pool: &PgPool, id: DbId, role: Role) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Set a parent's restricted-to-admin window.
    ///
    /// The update applies only when the target is a Parent in the given
    /// school; a missing row, wrong role, and wrong school all look the same
    /// to the caller (`None`).
    pub async fn restrict_parent(
        pool: &PgPool,
        parent_id: DbId,
        school_id: DbId,
        until: Timestamp,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Timestamp>(
            "UPDATE users SET restricted_to_admin_until = $3
             WHERE id = $1 AND school_id = $2 AND role = 'parent'
             RETURNING restricted_to_admin_until",
        )
        .bind(parent_id)
        .bind(school_id)
        .bind(until)
        .fetch_optional(pool)
        .await
    }

    /// Set a parent's ticket-creation block window. Same scoping rules as
    /// [`UserRepo::restrict_parent`].
    pub async fn block_parent_tickets(
        pool: &PgPool,
        parent_id: DbId,
        school_id: DbId,
        until: Timestamp,
    ) -> Result<Option<Timestamp>, sqlx::Error> {
        sqlx::query_scalar::<_, Timestamp>(
            "UPDATE users SET ticket_creation_blocked_until = $3
             WHERE id = $1 AND school_id = $2 AND role = 'parent'
             RETURNING ticket_creation_blocked_until",
        )
        .bind(parent_id)
        .bind(school_id)
        .bind(until)
        .fetch_optional(pool)
        .await
    }

    /// Role strings for a batch of users, for message attribution at read
    /// time.
    pub async fn roles_for_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<(DbId, String)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, String)>(
            "SELECT id, role FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }
}
