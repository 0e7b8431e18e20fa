//! Repository for announcements and read receipts.

use sqlx::PgPool;
use syncdesk_core::announcement::Audience;
use syncdesk_core::roles::Role;
use syncdesk_core::types::DbId;

use crate::models::announcement::{Announcement, AnnouncementWithRead, CreateAnnouncement};

const COLUMNS: &str = "\
    id, school_id, author_id, title, content, target_audience, \
    target_grade, target_class, created_at";

/// Provides announcement storage and audience-filtered delivery.
pub struct AnnouncementRepo;

impl AnnouncementRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateAnnouncement,
    ) -> Result<Announcement, sqlx::Error> {
        let query = format!(
            "INSERT INTO announcements
                (school_id, author_id, title, content, target_audience, target_grade, target_class)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Announcement>(&query)
            .bind(input.school_id)
            .bind(input.author_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(&input.target_audience)
            .bind(&input.target_grade)
            .bind(&input.target_class)
            .fetch_one(pool)
            .await
    }

    /// Announcements in the viewer's school whose audience includes the
    /// viewer's side, newest first, each carrying the viewer's read flag.
    pub async fn list_for_user(
        pool: &PgPool,
        viewer_id: DbId,
        viewer_role: Role,
        viewer_school_id: DbId,
    ) -> Result<Vec<AnnouncementWithRead>, sqlx::Error> {
        let side = if viewer_role == Role::Parent {
            Audience::Parents.as_str()
        } else {
            Audience::Staff.as_str()
        };
        let query = format!(
            "SELECT a.id, a.school_id, a.author_id, a.title, a.content,
                    a.target_audience, a.target_grade, a.target_class, a.created_at,
                    EXISTS (
                        SELECT 1 FROM announcement_reads ar
                        WHERE ar.announcement_id = a.id AND ar.user_id = $1
                    ) AS read
             FROM announcements a
             WHERE a.school_id = $2 AND a.target_audience IN ($3, '{both}')
             ORDER BY a.created_at DESC",
            both = Audience::Both.as_str()
        );
        sqlx::query_as::<_, AnnouncementWithRead>(&query)
            .bind(viewer_id)
            .bind(viewer_school_id)
            .bind(side)
            .fetch_all(pool)
            .await
    }

    /// Record that a user has read an announcement in their school.
    ///
    /// Idempotent: a repeat call neither errors nor adds a second row.
    /// Returns `false` only when the announcement does not exist in the
    /// given school.
    pub async fn mark_read(
        pool: &PgPool,
        announcement_id: DbId,
        user_id: DbId,
        school_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM announcements WHERE id = $1 AND school_id = $2",
        )
        .bind(announcement_id)
        .bind(school_id)
        .fetch_one(pool)
        .await?;
        if exists == 0 {
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO announcement_reads (announcement_id, user_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_announcement_reads_announcement_user DO NOTHING",
        )
        .bind(announcement_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(true)
    }

    /// Read receipts recorded against a school's announcements.
    pub async fn reads_count_for_school(
        pool: &PgPool,
        school_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM announcement_reads ar
             JOIN announcements a ON a.id = ar.announcement_id
             WHERE a.school_id = $1",
        )
        .bind(school_id)
        .fetch_one(pool)
        .await
    }

    /// Announcement total for a school.
    pub async fn count_for_school(pool: &PgPool, school_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM announcements WHERE school_id = $1",
        )
        .bind(school_id)
        .fetch_one(pool)
        .await
    }
}
