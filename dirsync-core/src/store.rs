use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgPool;

use crate::error::SyncError;
use crate::types::UserIdentity;

// On conflict, every non-key column is overwritten with the incoming values
// and `updated_at` is refreshed; `created_at` keeps its first-insert value.
const UPSERT_USER: &str = r#"
INSERT INTO user_infos (
    upn, email, display_name, unique_name, sam_account_name, school_status,
    identity_type, employee_id, name, department, title, office, office_phone,
    employee_type, funding_type_or_admission_year, student_category_primary,
    student_category_detail, student_nationality_type, residential_college,
    staff_role, mail_nickname, tags,
    created_at, updated_at
) VALUES (
    $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
    $15, $16, $17, $18, $19, $20, $21, $22, $23, $24
) ON CONFLICT (upn) DO UPDATE SET
    email = EXCLUDED.email,
    display_name = EXCLUDED.display_name,
    unique_name = EXCLUDED.unique_name,
    sam_account_name = EXCLUDED.sam_account_name,
    school_status = EXCLUDED.school_status,
    identity_type = EXCLUDED.identity_type,
    employee_id = EXCLUDED.employee_id,
    name = EXCLUDED.name,
    department = EXCLUDED.department,
    title = EXCLUDED.title,
    office = EXCLUDED.office,
    office_phone = EXCLUDED.office_phone,
    employee_type = EXCLUDED.employee_type,
    funding_type_or_admission_year = EXCLUDED.funding_type_or_admission_year,
    student_category_primary = EXCLUDED.student_category_primary,
    student_category_detail = EXCLUDED.student_category_detail,
    student_nationality_type = EXCLUDED.student_nationality_type,
    residential_college = EXCLUDED.residential_college,
    staff_role = EXCLUDED.staff_role,
    mail_nickname = EXCLUDED.mail_nickname,
    tags = EXCLUDED.tags,
    updated_at = EXCLUDED.updated_at
"#;

const DELETE_STALE: &str = "DELETE FROM user_infos WHERE updated_at < $1";

/// The relational store owning the `user_infos` table.
///
/// The pipeline only ever upserts by UPN and deletes by age; individual
/// rows are never deleted by identity. An identity no longer reported by
/// any source simply stops being refreshed and ages out.
#[derive(Clone)]
pub struct IdentityStore {
    pool: PgPool,
}

impl IdentityStore {
    /// Initialize a store over an already-connected pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the shipped migrations. Only used by deployments that let the
    /// sync own its table.
    pub async fn run_migrations(&self) -> Result<(), SyncError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|error| SyncError::MigrateError { error })
    }

    /// Write a batch of identity rows in one all-or-nothing transaction.
    ///
    /// Every row is stamped with `synced_at`, the single timestamp taken at
    /// the start of the run, so the sweeper's age comparison is unambiguous.
    /// If any statement fails the transaction is dropped and rolls back;
    /// nothing from the batch is committed. Returns the number of rows
    /// written.
    pub async fn upsert_batch(
        &self,
        records: &[UserIdentity],
        synced_at: DateTime<Utc>,
    ) -> Result<u64, SyncError> {
        let mut tx = self.pool.begin().await.map_err(|error| {
            SyncError::TransactionError {
                command: "BEGIN".to_owned(),
                error,
            }
        })?;

        for record in records {
            sqlx::query(UPSERT_USER)
                .bind(&record.upn)
                .bind(&record.email)
                .bind(&record.display_name)
                .bind(&record.unique_name)
                .bind(&record.sam_account_name)
                .bind(&record.school_status)
                .bind(&record.identity_type)
                .bind(&record.employee_id)
                .bind(&record.name)
                .bind(&record.department)
                .bind(&record.title)
                .bind(&record.office)
                .bind(&record.office_phone)
                .bind(&record.employee_type)
                .bind(&record.funding_type_or_admission_year)
                .bind(&record.student_category_primary)
                .bind(&record.student_category_detail)
                .bind(&record.student_nationality_type)
                .bind(&record.residential_college)
                .bind(&record.staff_role)
                .bind(&record.mail_nickname)
                .bind(&record.tags)
                .bind(synced_at)
                .bind(synced_at)
                .execute(&mut *tx)
                .await
                .map_err(|error| SyncError::QueryError {
                    command: "INSERT".to_owned(),
                    error,
                })?;
        }

        tx.commit().await.map_err(|error| {
            SyncError::TransactionError {
                command: "COMMIT".to_owned(),
                error,
            }
        })?;

        Ok(records.len() as u64)
    }

    /// Delete every row whose `updated_at` is older than `retention`,
    /// measured from now. Returns the number of rows removed.
    ///
    /// Must only run after a committed upsert; sweeping on top of a failed
    /// run would delete rows based on stale timestamps.
    pub async fn delete_stale(&self, retention: Duration) -> Result<u64, SyncError> {
        let cutoff = Utc::now() - retention;
        let result = sqlx::query(DELETE_STALE)
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|error| SyncError::QueryError {
                command: "DELETE".to_owned(),
                error,
            })?;

        Ok(result.rows_affected())
    }
}
