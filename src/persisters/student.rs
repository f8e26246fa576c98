use crate::models::student::{RequestType, Student, StudentError};
use crate::persisters::{Persist, Query};
use crate::state::State;

use sqlx::types::Uuid;

const STUDENT_COLUMNS: &str = "id, name, email, request_type, request_ready";

/// A validated registration, ready to insert. Produced by
/// [`crate::validate::registration`].
#[derive(Debug, Clone, PartialEq)]
pub struct StudentInsert {
    pub name: String,
    pub email: String,
    pub request_type: RequestType,
}

#[async_trait]
impl Persist for StudentInsert {
    type Ret = Student;
    type Error = StudentError;

    async fn persist(self, state: &State) -> Result<Self::Ret, Self::Error> {
        // Select-before-insert preserves the observable duplicate check; the
        // unique constraint on (email, request_type) catches the race between
        // the two statements, surfacing as the same AlreadyExists.
        let existing: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM students
            WHERE email = $1 AND request_type = $2
            "#,
        )
        .bind(&self.email)
        .bind(self.request_type.as_str())
        .fetch_one(&state.db_conn)
        .await?;

        if existing > 0 {
            return Err(StudentError::AlreadyExists);
        }

        let student = sqlx::query_as::<_, Student>(&format!(
            r#"
            INSERT INTO students (id, name, email, request_type, request_ready)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&self.name)
        .bind(&self.email)
        .bind(self.request_type.as_str())
        .fetch_one(&state.db_conn)
        .await?;

        Ok(student)
    }
}

/// Fetches every student row, unfiltered and unpaginated.
pub struct StudentList;

#[async_trait]
impl Query for StudentList {
    type Resolve = Vec<Student>;
    type Error = StudentError;

    async fn fetch(self, state: &State) -> Result<Self::Resolve, Self::Error> {
        let students = sqlx::query_as::<_, Student>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students"
        ))
        .fetch_all(&state.db_conn)
        .await?;

        Ok(students)
    }
}

/// Flips `request_ready` on one row. The "ready" email and the notification
/// row are the caller's business: a failed send must leave the flag flipped
/// with no notification appended.
#[derive(Debug)]
pub struct MarkReady {
    pub student_id: Uuid,
}

#[async_trait]
impl Persist for MarkReady {
    type Ret = Student;
    type Error = StudentError;

    async fn persist(self, state: &State) -> Result<Self::Ret, Self::Error> {
        // RowNotFound from fetch_one maps to StudentError::NotFound.
        let student = sqlx::query_as::<_, Student>(&format!(
            r#"
            UPDATE students
            SET request_ready = TRUE
            WHERE id = $1
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(self.student_id)
        .fetch_one(&state.db_conn)
        .await?;

        Ok(student)
    }
}

/// Hard delete; no soft-delete or audit trail beyond the log line below.
#[derive(Debug)]
pub struct StudentDelete {
    pub student_id: Uuid,
}

#[async_trait]
impl Persist for StudentDelete {
    type Ret = Student;
    type Error = StudentError;

    async fn persist(self, state: &State) -> Result<Self::Ret, Self::Error> {
        let student = sqlx::query_as::<_, Student>(&format!(
            r#"
            DELETE FROM students
            WHERE id = $1
            RETURNING {STUDENT_COLUMNS}
            "#
        ))
        .bind(self.student_id)
        .fetch_one(&state.db_conn)
        .await?;

        log::info!(
            "deleted student {} ({} <{}>, {}, ready: {})",
            student.id,
            student.name,
            student.email,
            student.request_type.as_str(),
            student.request_ready
        );

        Ok(student)
    }
}
