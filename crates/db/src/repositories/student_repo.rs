//! Repository for students and the parent-student link table.

use sqlx::PgPool;
use syncdesk_core::types::DbId;

use crate::models::student::{CreateStudent, Student};

const COLUMNS: &str = "id, school_id, class_name, section";

/// Provides student rows and parent linkage.
pub struct StudentRepo;

impl StudentRepo {
    /// Insert a new student (seed and test setup).
    pub async fn create(pool: &PgPool, input: &CreateStudent) -> Result<Student, sqlx::Error> {
        let query = format!(
            "INSERT INTO students (school_id, class_name, section)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Student>(&query)
            .bind(input.school_id)
            .bind(&input.class_name)
            .bind(&input.section)
            .fetch_one(pool)
            .await
    }

    /// Link a student to a parent. Idempotent.
    pub async fn link_parent(
        pool: &PgPool,
        parent_id: DbId,
        student_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO parent_students (parent_id, student_id)
             VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(parent_id)
        .bind(student_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Ids of all students linked to a parent.
    pub async fn student_ids_for_parent(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT student_id FROM parent_students WHERE parent_id = $1",
        )
        .bind(parent_id)
        .fetch_all(pool)
        .await
    }

    /// Full student rows linked to a parent, scoped to the parent's school.
    pub async fn students_for_parent(
        pool: &PgPool,
        parent_id: DbId,
        school_id: DbId,
    ) -> Result<Vec<Student>, sqlx::Error> {
        sqlx::query_as::<_, Student>(
            "SELECT s.id, s.school_id, s.class_name, s.section
             FROM students s
             JOIN parent_students ps ON ps.student_id = s.id
             WHERE ps.parent_id = $1 AND s.school_id = $2",
        )
        .bind(parent_id)
        .bind(school_id)
        .fetch_all(pool)
        .await
    }
}
