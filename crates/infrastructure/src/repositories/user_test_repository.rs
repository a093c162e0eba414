//! User test repository implementation.
//!
//! Persists user-assembled tests and their selected sections. Assignment and
//! deletion each run in one transaction holding a row lock on the user test.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Postgres, Row, Transaction};
use tracing::{debug, instrument};
use uuid::Uuid;

use ielts_application::ports::UserTestRepository;
use ielts_domain::{
    AccountId, AppResult, AssemblyError, NotFoundError, SectionId, UserTest, UserTestDetail,
    UserTestDetailId, UserTestId,
};

use super::parse_column;
use crate::database::TransactionExt;
use crate::{Error, Result};

/// PostgreSQL implementation of UserTestRepository.
pub struct PgUserTestRepository {
    pool: PgPool,
}

impl PgUserTestRepository {
    /// Create a new PostgreSQL user test repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_TEST_COLUMNS: &str = "id, account_id, name, test_type, skill, created_at";

fn row_to_user_test(row: &PgRow) -> Result<UserTest> {
    Ok(UserTest {
        id: UserTestId::from(row.get::<Uuid, _>("id")),
        account_id: AccountId::from(row.get::<Uuid, _>("account_id")),
        name: row.get("name"),
        test_type: parse_column("test_type", row.get("test_type"))?,
        skill: parse_column("skill", row.get("skill"))?,
        created_at: row.get("created_at"),
    })
}

fn row_to_detail(row: &PgRow) -> UserTestDetail {
    UserTestDetail {
        id: UserTestDetailId::from(row.get::<Uuid, _>("id")),
        user_test_id: UserTestId::from(row.get::<Uuid, _>("user_test_id")),
        section_id: SectionId::from(row.get::<Uuid, _>("section_id")),
    }
}

/// Lock the user test row; false if it does not exist
async fn lock_user_test(tx: &mut Transaction<'_, Postgres>, id: UserTestId) -> Result<bool> {
    let row = sqlx::query("SELECT id FROM user_tests WHERE id = $1 FOR UPDATE")
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await?;
    Ok(row.is_some())
}

async fn insert_details(
    tx: &mut Transaction<'_, Postgres>,
    id: UserTestId,
    section_ids: &[SectionId],
) -> AppResult<Vec<UserTestDetail>> {
    if !lock_user_test(tx, id).await? {
        return Err(NotFoundError::UserTest(id).into());
    }

    let assembled: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM user_test_details WHERE user_test_id = $1)",
    )
    .bind(id.as_uuid())
    .fetch_one(&mut **tx)
    .await
    .map_err(Error::Database)?;
    if assembled {
        return Err(AssemblyError::AlreadyAssembled(id).into());
    }

    let mut details = Vec::with_capacity(section_ids.len());
    for section_id in section_ids {
        let detail = UserTestDetail {
            id: UserTestDetailId::new(),
            user_test_id: id,
            section_id: *section_id,
        };
        sqlx::query(
            "INSERT INTO user_test_details (id, user_test_id, section_id) VALUES ($1, $2, $3)",
        )
        .bind(detail.id.as_uuid())
        .bind(id.as_uuid())
        .bind(section_id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
        details.push(detail);
    }

    Ok(details)
}

async fn delete_with_results(tx: &mut Transaction<'_, Postgres>, id: UserTestId) -> Result<bool> {
    if !lock_user_test(tx, id).await? {
        return Ok(false);
    }

    sqlx::query(
        r#"
        DELETE FROM result_details
        WHERE result_id IN (SELECT id FROM results WHERE user_test_id = $1)
        "#,
    )
    .bind(id.as_uuid())
    .execute(&mut **tx)
    .await?;

    sqlx::query("DELETE FROM results WHERE user_test_id = $1")
        .bind(id.as_uuid())
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM user_test_details WHERE user_test_id = $1")
        .bind(id.as_uuid())
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM user_tests WHERE id = $1")
        .bind(id.as_uuid())
        .execute(&mut **tx)
        .await?;

    Ok(true)
}

#[async_trait]
impl UserTestRepository for PgUserTestRepository {
    #[instrument(skip(self, user_test), fields(user_test_id = %user_test.id))]
    async fn create(&self, user_test: &UserTest) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_tests (id, account_id, name, test_type, skill, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user_test.id.as_uuid())
        .bind(user_test.account_id.as_uuid())
        .bind(&user_test.name)
        .bind(user_test.test_type.as_str())
        .bind(user_test.skill.as_str())
        .bind(user_test.created_at)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!("User test created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: UserTestId) -> AppResult<Option<UserTest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_tests WHERE id = $1",
            USER_TEST_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(row_to_user_test).transpose()?)
    }

    #[instrument(skip(self))]
    async fn find_by_name(&self, account_id: AccountId, name: &str) -> AppResult<Option<UserTest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM user_tests WHERE account_id = $1 AND name = $2",
            USER_TEST_COLUMNS
        ))
        .bind(account_id.as_uuid())
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(row_to_user_test).transpose()?)
    }

    #[instrument(skip(self))]
    async fn list_by_account(&self, account_id: AccountId) -> AppResult<Vec<UserTest>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM user_tests WHERE account_id = $1 ORDER BY created_at DESC",
            USER_TEST_COLUMNS
        ))
        .bind(account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(row_to_user_test)
            .collect::<Result<Vec<_>>>()?)
    }

    #[instrument(skip(self))]
    async fn rename(&self, id: UserTestId, name: &str) -> AppResult<()> {
        let updated = sqlx::query("UPDATE user_tests SET name = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        if updated == 0 {
            return Err(NotFoundError::UserTest(id).into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn details(&self, id: UserTestId) -> AppResult<Vec<UserTestDetail>> {
        let rows = sqlx::query(
            "SELECT id, user_test_id, section_id FROM user_test_details WHERE user_test_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_detail).collect())
    }

    #[instrument(skip(self, section_ids), fields(sections = section_ids.len()))]
    async fn assign_sections(
        &self,
        id: UserTestId,
        section_ids: &[SectionId],
    ) -> AppResult<Vec<UserTestDetail>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = insert_details(&mut tx, id, section_ids).await;
        tx.commit_or_rollback(result).await
    }

    #[instrument(skip(self))]
    async fn delete_cascade(&self, id: UserTestId) -> AppResult<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let result = delete_with_results(&mut tx, id).await;
        let deleted = tx.commit_or_rollback(result).await?;

        debug!(deleted, "User test cascade delete finished");
        Ok(deleted)
    }
}
