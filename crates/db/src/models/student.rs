//! Student entity model.

use serde::Serialize;
use sqlx::FromRow;
use syncdesk_core::types::DbId;

/// A row from the `students` table. Parents are linked via `parent_students`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Student {
    pub id: DbId,
    pub school_id: DbId,
    pub class_name: String,
    pub section: String,
}

/// DTO for creating a student (seed and test setup).
#[derive(Debug)]
pub struct CreateStudent {
    pub school_id: DbId,
    pub class_name: String,
    pub section: String,
}
