//! OTP repository
//!
//! At most one live code per email. Expired rows are deleted lazily the
//! next time the address is touched, never by a background sweep.

use anyhow::Result;
use chrono::{Duration, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::models::otp::OtpVerification;
use crate::otp::{OTP_COOLDOWN_SECONDS, OTP_MAX_ATTEMPTS, OTP_TTL_SECONDS};

/// OTP repository
#[derive(Clone)]
pub struct OtpRepository {
    pool: PgPool,
}

impl OtpRepository {
    /// Create a new OTP repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a fresh code for an email, replacing any dead record.
    ///
    /// Fails on the unique email constraint if a live record exists, so
    /// callers must check `find_live` first.
    pub async fn create(&self, email: &str, code: &str) -> Result<OtpVerification> {
        let expires_at = Utc::now() + Duration::seconds(OTP_TTL_SECONDS);

        let row = sqlx::query(
            r#"
            INSERT INTO otp_verifications (email, code, max_attempts, expires_at)
            VALUES (LOWER($1), $2, $3, $4)
            RETURNING id, email, code, attempts, max_attempts, cooldown_start,
                      expires_at, created_at
            "#,
        )
        .bind(email)
        .bind(code)
        .bind(OTP_MAX_ATTEMPTS)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_otp(&row))
    }

    /// Fetch the record for an email, pruning it first if it is dead.
    ///
    /// A record is dead once the code has expired and no cooldown window
    /// keeps it alive.
    pub async fn find_live(&self, email: &str) -> Result<Option<OtpVerification>> {
        sqlx::query(
            r#"
            DELETE FROM otp_verifications
            WHERE LOWER(email) = LOWER($1)
              AND expires_at <= NOW()
              AND (cooldown_start IS NULL
                   OR cooldown_start + make_interval(secs => $2) <= NOW())
            "#,
        )
        .bind(email)
        .bind(OTP_COOLDOWN_SECONDS as f64)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            r#"
            SELECT id, email, code, attempts, max_attempts, cooldown_start,
                   expires_at, created_at
            FROM otp_verifications
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| map_otp(&r)))
    }

    /// Count a failed verification; starts the cooldown at exhaustion
    pub async fn record_failed_attempt(&self, id: Uuid) -> Result<i32> {
        let row = sqlx::query(
            r#"
            UPDATE otp_verifications SET
                attempts = attempts + 1,
                cooldown_start = CASE
                    WHEN attempts + 1 >= max_attempts THEN NOW()
                    ELSE cooldown_start
                END
            WHERE id = $1
            RETURNING attempts
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("attempts"))
    }

    /// Consume a verified code
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM otp_verifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn map_otp(row: &PgRow) -> OtpVerification {
    OtpVerification {
        id: row.get("id"),
        email: row.get("email"),
        code: row.get("code"),
        attempts: row.get("attempts"),
        max_attempts: row.get("max_attempts"),
        cooldown_start: row.get("cooldown_start"),
        expires_at: row.get("expires_at"),
        created_at: row.get("created_at"),
    }
}
