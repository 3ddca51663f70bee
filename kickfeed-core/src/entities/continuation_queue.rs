//! Durable delayed work queue backed by the `continuation_queue` table.
//!
//! Items become visible at `visible_at`. Leasing pushes `visible_at` forward
//! so a crashed worker's item reappears once the lease expires; acking
//! deletes the row.

use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use kickfeed_sdk::objects::ContinuationMessage;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LeasedContinuation {
    pub id: i64,
    pub payload: sqlx::types::Json<ContinuationMessage>,
    pub attempts: i32,
}

#[derive(Debug, Clone)]
/// Enqueue a continuation to become visible after `delay_secs`.
pub struct EnqueueContinuation {
    pub message: ContinuationMessage,
    pub delay_secs: f64,
}

impl Processor<EnqueueContinuation> for DatabaseProcessor {
    type Output = i64;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:EnqueueContinuation")]
    async fn process(&self, cmd: EnqueueContinuation) -> Result<i64, sqlx::Error> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO continuation_queue (payload, visible_at)
            VALUES ($1, (NOW() AT TIME ZONE 'utc') + make_interval(secs => $2))
            RETURNING id
            "#,
        )
        .bind(sqlx::types::Json(cmd.message))
        .bind(cmd.delay_secs)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}

#[derive(Debug, Clone)]
/// Lease the oldest visible item, hiding it for `lease_secs`.
///
/// Uses SKIP LOCKED so several workers can lease concurrently without
/// handing out the same row.
pub struct LeaseContinuation {
    pub lease_secs: f64,
}

impl Processor<LeaseContinuation> for DatabaseProcessor {
    type Output = Option<LeasedContinuation>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:LeaseContinuation")]
    async fn process(
        &self,
        cmd: LeaseContinuation,
    ) -> Result<Option<LeasedContinuation>, sqlx::Error> {
        let leased = sqlx::query_as::<_, LeasedContinuation>(
            r#"
            UPDATE continuation_queue
            SET visible_at = (NOW() AT TIME ZONE 'utc') + make_interval(secs => $1),
                attempts = attempts + 1
            WHERE id = (
                SELECT id FROM continuation_queue
                WHERE visible_at <= (NOW() AT TIME ZONE 'utc')
                ORDER BY visible_at ASC, id ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, payload, attempts
            "#,
        )
        .bind(cmd.lease_secs)
        .fetch_optional(&self.pool)
        .await?;
        Ok(leased)
    }
}

#[derive(Debug, Clone)]
/// Acknowledge a leased item, removing it from the queue.
pub struct AckContinuation {
    pub id: i64,
}

impl Processor<AckContinuation> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:AckContinuation")]
    async fn process(&self, cmd: AckContinuation) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM continuation_queue WHERE id = $1")
            .bind(cmd.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
