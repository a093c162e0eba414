//! Result repository implementation.
//!
//! Persists completed attempts and their per-question outcomes. A result
//! refers either to a public test (`test_id`) or to a user test
//! (`user_test_id`), never both.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Postgres, Row, Transaction};
use std::collections::HashSet;
use tracing::{debug, instrument};
use uuid::Uuid;

use ielts_application::ports::ResultRepository;
use ielts_domain::{
    AccountId, AppResult, NotFoundError, QuestionId, QuestionState, ResultDetail, ResultDetailId,
    ResultId, ScoringError, TestId, TestReference, TestResult, UserTestId,
};

use super::{duration_to_millis, millis_to_duration, to_i32, to_u32};
use crate::database::TransactionExt;
use crate::{Error, Result};

/// PostgreSQL implementation of ResultRepository.
pub struct PgResultRepository {
    pool: PgPool,
}

impl PgResultRepository {
    /// Create a new PostgreSQL result repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn query_results(&self, filter: &str, account_id: Option<AccountId>) -> Result<Vec<TestResult>> {
        let sql = format!(
            "SELECT {} FROM results WHERE {} ORDER BY created_at DESC",
            RESULT_COLUMNS, filter
        );
        let mut query = sqlx::query(&sql);
        if let Some(account_id) = account_id {
            query = query.bind(account_id.into_uuid());
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(row_to_result).collect()
    }
}

const RESULT_COLUMNS: &str =
    "id, account_id, test_id, user_test_id, score, complete_time_ms, created_at";

fn row_to_result(row: &PgRow) -> Result<TestResult> {
    let id = ResultId::from(row.get::<Uuid, _>("id"));
    let test_id: Option<Uuid> = row.get("test_id");
    let user_test_id: Option<Uuid> = row.get("user_test_id");

    let test = match (test_id, user_test_id) {
        (Some(test_id), None) => TestReference::Public(TestId::from(test_id)),
        (None, Some(user_test_id)) => TestReference::Private(UserTestId::from(user_test_id)),
        _ => return Err(Error::corrupt(format!("result {} test reference", id))),
    };

    Ok(TestResult {
        id,
        account_id: AccountId::from(row.get::<Uuid, _>("account_id")),
        test,
        score: to_u32("score", row.get("score"))?,
        complete_time: millis_to_duration(row.get("complete_time_ms"))?,
        created_at: row.get("created_at"),
    })
}

fn parse_state(s: &str) -> Result<QuestionState> {
    match s {
        "right" => Ok(QuestionState::Right),
        "wrong" => Ok(QuestionState::Wrong),
        other => Err(Error::corrupt(format!("state '{}'", other))),
    }
}

fn row_to_detail(row: &PgRow) -> Result<ResultDetail> {
    Ok(ResultDetail {
        id: ResultDetailId::from(row.get::<Uuid, _>("id")),
        result_id: ResultId::from(row.get::<Uuid, _>("result_id")),
        question_order: to_u32("question_order", row.get("question_order"))?,
        question_id: QuestionId::from(row.get::<Uuid, _>("question_id")),
        user_answer: row.get("user_answer"),
        state: parse_state(row.get("state"))?,
    })
}

async fn insert_result(tx: &mut Transaction<'_, Postgres>, result: &TestResult) -> AppResult<()> {
    let (test_id, user_test_id) = match result.test {
        TestReference::Public(test_id) => {
            let bumped = sqlx::query(
                "UPDATE tests SET completed_count = completed_count + 1 WHERE id = $1",
            )
            .bind(test_id.as_uuid())
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();
            if bumped == 0 {
                return Err(NotFoundError::Test(test_id).into());
            }
            (Some(test_id.into_uuid()), None)
        }
        TestReference::Private(user_test_id) => (None, Some(user_test_id.into_uuid())),
    };

    sqlx::query(
        r#"
        INSERT INTO results (id, account_id, test_id, user_test_id, score, complete_time_ms, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(result.id.as_uuid())
    .bind(result.account_id.as_uuid())
    .bind(test_id)
    .bind(user_test_id)
    .bind(to_i32("score", result.score)?)
    .bind(duration_to_millis(result.complete_time)?)
    .bind(result.created_at)
    .execute(&mut **tx)
    .await
    .map_err(Error::Database)?;

    Ok(())
}

async fn insert_outcomes(
    tx: &mut Transaction<'_, Postgres>,
    result_id: ResultId,
    details: &[ResultDetail],
) -> AppResult<u32> {
    let locked = sqlx::query("SELECT id FROM results WHERE id = $1 FOR UPDATE")
        .bind(result_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?;
    if locked.is_none() {
        return Err(NotFoundError::Result(result_id).into());
    }

    let existing: Vec<i32> =
        sqlx::query_scalar("SELECT question_order FROM result_details WHERE result_id = $1")
            .bind(result_id.as_uuid())
            .fetch_all(&mut **tx)
            .await
            .map_err(Error::Database)?;

    let mut taken = existing
        .into_iter()
        .map(|order| to_u32("question_order", order))
        .collect::<Result<HashSet<u32>>>()?;
    for detail in details {
        if !taken.insert(detail.question_order) {
            return Err(ScoringError::DuplicateQuestionOrder {
                result_id,
                order: detail.question_order,
            }
            .into());
        }
    }

    for detail in details {
        sqlx::query(
            r#"
            INSERT INTO result_details (id, result_id, question_order, question_id, user_answer, state)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(detail.id.as_uuid())
        .bind(result_id.as_uuid())
        .bind(to_i32("question_order", detail.question_order)?)
        .bind(detail.question_id.as_uuid())
        .bind(&detail.user_answer)
        .bind(detail.state.as_str())
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
    }

    let right = details.iter().filter(|d| d.state.is_right()).count() as u32;
    let score: i32 = sqlx::query_scalar("UPDATE results SET score = score + $2 WHERE id = $1 RETURNING score")
        .bind(result_id.as_uuid())
        .bind(to_i32("score", right)?)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

    Ok(to_u32("score", score)?)
}

#[async_trait]
impl ResultRepository for PgResultRepository {
    #[instrument(skip(self, result), fields(result_id = %result.id, access = result.test.access().as_str()))]
    async fn create(&self, result: &TestResult) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let outcome = insert_result(&mut tx, result).await;
        tx.commit_or_rollback(outcome).await?;

        debug!("Result created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: ResultId) -> AppResult<Option<TestResult>> {
        let row = sqlx::query(&format!("SELECT {} FROM results WHERE id = $1", RESULT_COLUMNS))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(row_to_result).transpose()?)
    }

    #[instrument(skip(self))]
    async fn list_by_account(&self, account_id: AccountId) -> AppResult<Vec<TestResult>> {
        Ok(self.query_results("account_id = $1", Some(account_id)).await?)
    }

    #[instrument(skip(self))]
    async fn list_public(&self) -> AppResult<Vec<TestResult>> {
        Ok(self.query_results("test_id IS NOT NULL", None).await?)
    }

    #[instrument(skip(self))]
    async fn details(&self, result_id: ResultId) -> AppResult<Vec<ResultDetail>> {
        let rows = sqlx::query(
            r#"
            SELECT id, result_id, question_order, question_id, user_answer, state
            FROM result_details
            WHERE result_id = $1
            ORDER BY question_order
            "#,
        )
        .bind(result_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(row_to_detail)
            .collect::<Result<Vec<_>>>()?)
    }

    #[instrument(skip(self, details), fields(details = details.len()))]
    async fn record_outcomes(&self, result_id: ResultId, details: &[ResultDetail]) -> AppResult<u32> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let outcome = insert_outcomes(&mut tx, result_id, details).await;
        let score = tx.commit_or_rollback(outcome).await?;

        debug!(score, "Outcomes recorded");
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names() {
        for state in [QuestionState::Right, QuestionState::Wrong] {
            assert_eq!(parse_state(state.as_str()).unwrap(), state);
        }
        assert!(parse_state("partial").is_err());
    }
}
