//! Announcement models.

use sqlx::FromRow;
use syncdesk_core::types::{DbId, Timestamp};

/// A row from the `announcements` table.
#[derive(Debug, Clone, FromRow)]
pub struct Announcement {
    pub id: DbId,
    pub school_id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub content: String,
    pub target_audience: String,
    pub target_grade: Option<String>,
    pub target_class: Option<String>,
    pub created_at: Timestamp,
}

/// An announcement joined with the caller's read flag.
#[derive(Debug, Clone, FromRow)]
pub struct AnnouncementWithRead {
    pub id: DbId,
    pub school_id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub content: String,
    pub target_audience: String,
    pub target_grade: Option<String>,
    pub target_class: Option<String>,
    pub created_at: Timestamp,
    pub read: bool,
}

/// DTO for creating an announcement.
#[derive(Debug)]
pub struct CreateAnnouncement {
    pub school_id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub content: String,
    pub target_audience: String,
    pub target_grade: Option<String>,
    pub target_class: Option<String>,
}
