//! Repository for tickets and their owned collections.
//!
//! Multi-row flows (create with student links, staff reply with implicit
//! status advance, reopen) run inside a single transaction so concurrent
//! staff actions on the same ticket cannot interleave partially.

use sqlx::{PgPool, Postgres, Transaction};
use syncdesk_core::guardrails::CreationHistory;
use syncdesk_core::roles::Role;
use syncdesk_core::ticket::{self, TicketCategory, TicketStatus};
use syncdesk_core::types::{DbId, Timestamp};

use crate::models::ticket::{CreateTicket, InternalNote, Ticket, TicketMessage, TicketReopen};

/// Column list for `tickets` queries.
const COLUMNS: &str = "\
    id, school_id, created_by_id, category, status, urgency, assigned_to_id, \
    title, description, satisfied_at, known_issue, abuse_flagged, abuse_flagged_at, \
    abuse_flagged_by_id, escalation_snoozed_until, deleted_at, created_at, updated_at";

/// Provides ticket storage and the lifecycle write paths.
pub struct TicketRepo;

impl TicketRepo {
    // -----------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------

    /// Insert a ticket and its student links in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateTicket) -> Result<Ticket, sqlx::Error> {
        let mut tx: Transaction<'_, Postgres> = pool.begin().await?;

        let query = format!(
            "INSERT INTO tickets (school_id, created_by_id, category, urgency, title, description)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&query)
            .bind(input.school_id)
            .bind(input.created_by_id)
            .bind(input.category.as_str())
            .bind(input.urgency)
            .bind(&input.title)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await?;

        for student_id in &input.student_ids {
            sqlx::query("INSERT INTO ticket_students (ticket_id, student_id) VALUES ($1, $2)")
                .bind(ticket.id)
                .bind(student_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(ticket)
    }

    // -----------------------------------------------------------------
    // Visibility-filtered reads
    // -----------------------------------------------------------------

    /// Find a ticket through the viewer's visibility filter.
    ///
    /// Parents match only their own tickets; staff match by school.
    /// Soft-deleted tickets match nobody. An invisible ticket and a missing
    /// one are indistinguishable (`None`).
    pub async fn find_for_user(
        pool: &PgPool,
        ticket_id: DbId,
        viewer_id: DbId,
        viewer_role: Role,
        viewer_school_id: DbId,
    ) -> Result<Option<Ticket>, sqlx::Error> {
        let query = if viewer_role == Role::Parent {
            format!(
                "SELECT {COLUMNS} FROM tickets
                 WHERE id = $1 AND deleted_at IS NULL AND created_by_id = $2"
            )
        } else {
            format!(
                "SELECT {COLUMNS} FROM tickets
                 WHERE id = $1 AND deleted_at IS NULL AND school_id = $2"
            )
        };
        let scope = if viewer_role == Role::Parent {
            viewer_id
        } else {
            viewer_school_id
        };
        sqlx::query_as::<_, Ticket>(&query)
            .bind(ticket_id)
            .bind(scope)
            .fetch_optional(pool)
            .await
    }

    /// List tickets through the viewer's visibility filter, most recently
    /// active first.
    pub async fn list_for_user(
        pool: &PgPool,
        viewer_id: DbId,
        viewer_role: Role,
        viewer_school_id: DbId,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        if viewer_role == Role::Parent {
            let query = format!(
                "SELECT {COLUMNS} FROM tickets
                 WHERE deleted_at IS NULL AND created_by_id = $1
                 ORDER BY updated_at DESC"
            );
            sqlx::query_as::<_, Ticket>(&query)
                .bind(viewer_id)
                .fetch_all(pool)
                .await
        } else {
            let query = format!(
                "SELECT {COLUMNS} FROM tickets
                 WHERE deleted_at IS NULL AND school_id = $1
                 ORDER BY updated_at DESC"
            );
            sqlx::query_as::<_, Ticket>(&query)
                .bind(viewer_school_id)
                .fetch_all(pool)
                .await
        }
    }

    // -----------------------------------------------------------------
    // Guardrail history snapshot
    // -----------------------------------------------------------------

    /// Gather the per-parent creation history the guardrail engine needs.
    ///
    /// Scoping is deliberately uneven: open counts are school-scoped, while
    /// the most-recent-creation lookup and both trailing-week counts span
    /// all of the parent's tickets regardless of school.
    pub async fn creation_history(
        pool: &PgPool,
        parent_id: DbId,
        school_id: DbId,
        blocked_until: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<CreationHistory, sqlx::Error> {
        let open_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets
             WHERE created_by_id = $1 AND school_id = $2
               AND status IN ('pending', 'in_progress') AND deleted_at IS NULL",
        )
        .bind(parent_id)
        .bind(school_id)
        .fetch_one(pool)
        .await?;

        let last_created_at = sqlx::query_scalar::<_, Option<Timestamp>>(
            "SELECT MAX(created_at) FROM tickets WHERE created_by_id = $1",
        )
        .bind(parent_id)
        .fetch_one(pool)
        .await?;

        let week_ago = now - chrono::Duration::days(7);

        let week_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets WHERE created_by_id = $1 AND created_at >= $2",
        )
        .bind(parent_id)
        .bind(week_ago)
        .fetch_one(pool)
        .await?;

        let open_other_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets
             WHERE created_by_id = $1 AND school_id = $2 AND category = 'other'
               AND status IN ('pending', 'in_progress') AND deleted_at IS NULL",
        )
        .bind(parent_id)
        .bind(school_id)
        .fetch_one(pool)
        .await?;

        let urgent_week_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tickets
             WHERE created_by_id = $1 AND urgency = TRUE AND created_at >= $2",
        )
        .bind(parent_id)
        .bind(week_ago)
        .fetch_one(pool)
        .await?;

        Ok(CreationHistory {
            blocked_until,
            open_count,
            last_created_at,
            week_count,
            open_other_count,
            urgent_week_count,
        })
    }

    // -----------------------------------------------------------------
    // Messages and notes
    // -----------------------------------------------------------------

    /// Append a reply and apply the single implicit transition: a staff
    /// reply on a pending ticket advances it to in-progress. The ticket's
    /// `updated_at` is always touched so listings surface recent activity.
    pub async fn add_reply(
        pool: &PgPool,
        ticket_id: DbId,
        sender_id: DbId,
        sender_is_staff: bool,
        body: &str,
    ) -> Result<TicketMessage, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let message = sqlx::query_as::<_, TicketMessage>(
            "INSERT INTO ticket_messages (ticket_id, sender_id, body)
             VALUES ($1, $2, $3)
             RETURNING id, ticket_id, sender_id, body, created_at",
        )
        .bind(ticket_id)
        .bind(sender_id)
        .bind(body)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE tickets SET
                status = CASE WHEN $2 AND status = 'pending' THEN 'in_progress' ELSE status END,
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(ticket_id)
        .bind(sender_is_staff)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(message)
    }

    /// All messages for a ticket in creation order.
    pub async fn messages(
        pool: &PgPool,
        ticket_id: DbId,
    ) -> Result<Vec<TicketMessage>, sqlx::Error> {
        sqlx::query_as::<_, TicketMessage>(
            "SELECT id, ticket_id, sender_id, body, created_at
             FROM ticket_messages WHERE ticket_id = $1 ORDER BY created_at, id",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
    }

    /// Append a staff-only internal note.
    pub async fn add_internal_note(
        pool: &PgPool,
        ticket_id: DbId,
        author_id: DbId,
        body: &str,
    ) -> Result<InternalNote, sqlx::Error> {
        sqlx::query_as::<_, InternalNote>(
            "INSERT INTO internal_notes (ticket_id, author_id, body)
             VALUES ($1, $2, $3)
             RETURNING id, ticket_id, author_id, body, created_at",
        )
        .bind(ticket_id)
        .bind(author_id)
        .bind(body)
        .fetch_one(pool)
        .await
    }

    /// Number of internal notes on a ticket.
    pub async fn internal_notes_count(pool: &PgPool, ticket_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM internal_notes WHERE ticket_id = $1",
        )
        .bind(ticket_id)
        .fetch_one(pool)
        .await
    }

    /// Ids of students linked to a ticket.
    pub async fn student_ids(pool: &PgPool, ticket_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT student_id FROM ticket_students WHERE ticket_id = $1 ORDER BY student_id",
        )
        .bind(ticket_id)
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------
    // Explicit lifecycle writes
    // -----------------------------------------------------------------

    /// Set the status of a ticket visible to a staff member of the given
    /// school. Returns `false` when the ticket is missing, deleted, or in
    /// another school.
    pub async fn set_status(
        pool: &PgPool,
        ticket_id: DbId,
        school_id: DbId,
        new_status: TicketStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tickets SET status = $3, updated_at = NOW()
             WHERE id = $1 AND school_id = $2 AND deleted_at IS NULL",
        )
        .bind(ticket_id)
        .bind(school_id)
        .bind(new_status.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a parent's reopen request if admissible.
    ///
    /// The ticket row is locked for the duration of the transaction so two
    /// concurrent requests cannot both pass the lifetime cap. Returns `None`
    /// when the ticket is invisible to the parent, not resolved, or already
    /// at the reopen cap; the caller cannot distinguish which.
    pub async fn request_reopen(
        pool: &PgPool,
        ticket_id: DbId,
        parent_id: DbId,
        reason: &str,
    ) -> Result<Option<TicketReopen>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let status = sqlx::query_scalar::<_, String>(
            "SELECT status FROM tickets
             WHERE id = $1 AND created_by_id = $2 AND deleted_at IS NULL
             FOR UPDATE",
        )
        .bind(ticket_id)
        .bind(parent_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(status) = status else {
            return Ok(None);
        };
        let Ok(status) = TicketStatus::parse(&status) else {
            return Ok(None);
        };

        let prior_reopens = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ticket_reopens WHERE ticket_id = $1",
        )
        .bind(ticket_id)
        .fetch_one(&mut *tx)
        .await?;

        if !ticket::can_reopen(status, prior_reopens) {
            return Ok(None);
        }

        let reopen = sqlx::query_as::<_, TicketReopen>(
            "INSERT INTO ticket_reopens (ticket_id, requested_by_id, reason)
             VALUES ($1, $2, $3)
             RETURNING id, ticket_id, requested_by_id, reason, created_at",
        )
        .bind(ticket_id)
        .bind(parent_id)
        .bind(reason)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE tickets SET status = 'pending', satisfied_at = NULL, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(ticket_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(reopen))
    }

    /// Number of reopen requests ever recorded for a ticket.
    pub async fn reopen_count(pool: &PgPool, ticket_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM ticket_reopens WHERE ticket_id = $1",
        )
        .bind(ticket_id)
        .fetch_one(pool)
        .await
    }

    /// Stamp the creating parent's satisfaction confirmation on a resolved
    /// ticket. Returns `false` for any other combination.
    pub async fn mark_satisfied(
        pool: &PgPool,
        ticket_id: DbId,
        parent_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tickets SET satisfied_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND created_by_id = $2 AND status = 'resolved'
               AND deleted_at IS NULL",
        )
        .bind(ticket_id)
        .bind(parent_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Toggle the known-issue flag. Applies only to Transport-category
    /// tickets in the given school; the role gate lives with the caller.
    pub async fn set_known_issue(
        pool: &PgPool,
        ticket_id: DbId,
        school_id: DbId,
        known_issue: bool,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tickets SET known_issue = $3, updated_at = NOW()
             WHERE id = $1 AND school_id = $2 AND category = $4 AND deleted_at IS NULL",
        )
        .bind(ticket_id)
        .bind(school_id)
        .bind(known_issue)
        .bind(TicketCategory::Transport.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Assign a ticket to a staff member. No endpoint mutates this today;
    /// seed data and future staff workflows go through here.
    pub async fn assign(
        pool: &PgPool,
        ticket_id: DbId,
        assignee_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tickets SET assigned_to_id = $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(ticket_id)
        .bind(assignee_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Soft-delete a ticket. Hidden from all standard read paths afterwards.
    pub async fn soft_delete(pool: &PgPool, ticket_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tickets SET deleted_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(ticket_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------
    // Moderation
    // -----------------------------------------------------------------

    /// Overwrite the abuse flag fields for a ticket in the flagger's school.
    /// Repeat flags overwrite, they never accumulate.
    pub async fn flag_abuse(
        pool: &PgPool,
        ticket_id: DbId,
        school_id: DbId,
        flagger_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tickets SET
                abuse_flagged = TRUE,
                abuse_flagged_at = NOW(),
                abuse_flagged_by_id = $3
             WHERE id = $1 AND school_id = $2",
        )
        .bind(ticket_id)
        .bind(school_id)
        .bind(flagger_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Non-deleted flagged tickets for a school, most recently flagged first.
    pub async fn list_abuse_flagged(
        pool: &PgPool,
        school_id: DbId,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets
             WHERE school_id = $1 AND abuse_flagged = TRUE AND deleted_at IS NULL
             ORDER BY abuse_flagged_at DESC"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(school_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------
    // Admin reporting
    // -----------------------------------------------------------------

    /// (total, resolved) non-deleted ticket counts for a school.
    pub async fn counts_for_school(
        pool: &PgPool,
        school_id: DbId,
    ) -> Result<(i64, i64), sqlx::Error> {
        sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE status = 'resolved')
             FROM tickets WHERE school_id = $1 AND deleted_at IS NULL",
        )
        .bind(school_id)
        .fetch_one(pool)
        .await
    }

    /// Total reopen requests across all tickets.
    pub async fn reopen_total(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ticket_reopens")
            .fetch_one(pool)
            .await
    }

    /// Most recent non-deleted tickets for a school, capped for export.
    pub async fn export_recent(
        pool: &PgPool,
        school_id: DbId,
        limit: i64,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tickets
             WHERE school_id = $1 AND deleted_at IS NULL
             ORDER BY created_at DESC LIMIT $2"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(school_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
