use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::WaitlistEmail;

/// Postgres error code for `unique_violation`.
/// https://www.postgresql.org/docs/current/errcodes-appendix.html
const UNIQUE_VIOLATION: &str = "23505";

/// Why an insert was rejected. Handlers only ever see these two cases; the
/// provider-specific error code never leaves this module.
#[derive(thiserror::Error, Debug)]
pub enum InsertError {
    #[error("email is already on the waitlist")]
    Duplicate,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The one capability the submission handler depends on: insert an email into
/// the `waitlist` collection, reporting success, a uniqueness conflict, or an
/// opaque failure.
///
/// Constructed once in `startup` and handed to handlers via `web::Data`, so
/// swapping the backend (or running without one) never touches the handler.
pub enum WaitlistStore {
    Postgres(PgPool),
    /// No database configured. Submissions are logged and reported as
    /// successful, so the landing page stays functional with no backend.
    Disabled,
}

impl WaitlistStore {
    /// Exactly one write per call; no retries.
    #[tracing::instrument(name = "INSERTing email into waitlist", skip(self, email))]
    pub async fn insert_email(
        &self,
        email: &WaitlistEmail,
    ) -> Result<(), InsertError> {
        let pool = match self {
            WaitlistStore::Postgres(pool) => pool,
            WaitlistStore::Disabled => {
                tracing::info!(
                    waitlist_email = %email.as_ref(),
                    "no waitlist store configured, recording submission in logs only"
                );
                return Ok(());
            }
        };

        sqlx::query(
            "
    INSERT INTO waitlist (id, email, joined_at)
    VALUES ($1, $2, $3)
",
        )
        .bind(Uuid::new_v4())
        .bind(email.as_ref())
        .bind(Utc::now())
        .execute(pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                // expected under normal operation (user resubmits), so no error log
                tracing::info!(waitlist_email = %email.as_ref(), "email already on waitlist");
                InsertError::Duplicate
            } else {
                tracing::error!("bad query: {e:?}");
                InsertError::Other(anyhow::Error::from(e).context("failed to insert email"))
            }
        })?;
        Ok(())
    }
}

/// The db rejects a duplicate email via the UNIQUE constraint on the
/// `waitlist.email` column; everything else (connection refused, dropped
/// column, ...) is an opaque failure.
fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}
