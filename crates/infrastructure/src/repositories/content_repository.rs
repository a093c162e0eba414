//! Content repository implementation.
//!
//! Read-only access to authored tests, sections, sounds, question lists,
//! questions and explanations.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use tracing::{debug, instrument};
use uuid::Uuid;

use ielts_application::ports::ContentRepository;
use ielts_domain::{
    AppResult, Explanation, ExplanationId, ListeningSection, Question, QuestionId, QuestionList,
    QuestionListId, ReadingSection, SectionId, Sound, SoundId, Test, TestId,
};

use super::{parse_column, to_u32};
use crate::{Error, Result};

/// PostgreSQL implementation of ContentRepository.
pub struct PgContentRepository {
    pool: PgPool,
}

impl PgContentRepository {
    /// Create a new PostgreSQL content repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// First association per list from one of the association tables
    async fn first_sections(&self, table: &str) -> Result<HashMap<Uuid, Uuid>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT DISTINCT ON (question_list_id) question_list_id, section_id
            FROM {}
            ORDER BY question_list_id, id
            "#,
            table
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("question_list_id"), row.get("section_id")))
            .collect())
    }
}

fn row_to_test(row: &PgRow) -> Result<Test> {
    Ok(Test {
        id: TestId::from(row.get::<Uuid, _>("id")),
        skill: parse_column("skill", row.get("skill"))?,
        test_type: parse_column("test_type", row.get("test_type"))?,
        name: row.get("name"),
        month_edition: to_u32("month_edition", row.get("month_edition"))?,
        year_edition: row.get("year_edition"),
        completed_count: to_u32("completed_count", row.get("completed_count"))?,
    })
}

fn row_to_listening_section(row: &PgRow) -> Result<ListeningSection> {
    Ok(ListeningSection {
        id: SectionId::from(row.get::<Uuid, _>("id")),
        sound_id: SoundId::from(row.get::<Uuid, _>("sound_id")),
        order: to_u32("position", row.get("position"))?,
        time_offset: row.get("time_offset"),
        transcript: row.get("transcript"),
    })
}

const LISTENING_SECTION_COLUMNS: &str = "id, sound_id, position, time_offset, transcript";

#[async_trait]
impl ContentRepository for PgContentRepository {
    #[instrument(skip(self))]
    async fn get_test(&self, id: TestId) -> AppResult<Option<Test>> {
        let row = sqlx::query(
            r#"
            SELECT id, skill, test_type, name, month_edition, year_edition, completed_count
            FROM tests
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.as_ref().map(row_to_test).transpose()?)
    }

    #[instrument(skip(self))]
    async fn list_question_lists(&self) -> AppResult<Vec<QuestionList>> {
        let rows = sqlx::query(
            r#"
            SELECT ql.id, ql.list_type, ql.content, COUNT(q.id) AS question_count
            FROM question_lists ql
            LEFT JOIN questions q ON q.question_list_id = ql.id
            GROUP BY ql.id
            ORDER BY ql.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let reading = self.first_sections("question_list_reading_sections").await?;
        let listening = self.first_sections("question_list_listening_sections").await?;

        let mut lists = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.get("id");
            let question_count: i64 = row.get("question_count");
            lists.push(QuestionList {
                id: QuestionListId::from(id),
                list_type: parse_column("list_type", row.get("list_type"))?,
                question_count: u32::try_from(question_count)
                    .map_err(|_| Error::corrupt(format!("question_count {}", question_count)))?,
                content: row.get("content"),
                reading_sections: reading.get(&id).map(|s| SectionId::from(*s)).into_iter().collect(),
                listening_sections: listening
                    .get(&id)
                    .map(|s| SectionId::from(*s))
                    .into_iter()
                    .collect(),
            });
        }

        debug!(count = lists.len(), "Loaded question lists");
        Ok(lists)
    }

    #[instrument(skip(self))]
    async fn reading_sections_for_test(&self, test_id: TestId) -> AppResult<Vec<ReadingSection>> {
        let rows = sqlx::query(
            r#"
            SELECT id, test_id, title, content, image
            FROM reading_sections
            WHERE test_id = $1
            "#,
        )
        .bind(test_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| ReadingSection {
                id: SectionId::from(row.get::<Uuid, _>("id")),
                test_id: TestId::from(row.get::<Uuid, _>("test_id")),
                title: row.get("title"),
                content: row.get("content"),
                image: row.get("image"),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn sound_for_test(&self, test_id: TestId) -> AppResult<Option<Sound>> {
        let row = sqlx::query("SELECT id, test_id, audio FROM sounds WHERE test_id = $1")
            .bind(test_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|row| Sound {
            id: SoundId::from(row.get::<Uuid, _>("id")),
            test_id: TestId::from(row.get::<Uuid, _>("test_id")),
            audio: row.get("audio"),
        }))
    }

    #[instrument(skip(self))]
    async fn list_listening_sections(&self) -> AppResult<Vec<ListeningSection>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM listening_sections ORDER BY sound_id, position",
            LISTENING_SECTION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(row_to_listening_section)
            .collect::<Result<Vec<_>>>()?)
    }

    #[instrument(skip(self))]
    async fn listening_sections_for_sound(
        &self,
        sound_id: SoundId,
    ) -> AppResult<Vec<ListeningSection>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM listening_sections WHERE sound_id = $1 ORDER BY position",
            LISTENING_SECTION_COLUMNS
        ))
        .bind(sound_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .iter()
            .map(row_to_listening_section)
            .collect::<Result<Vec<_>>>()?)
    }

    #[instrument(skip(self))]
    async fn get_question(&self, id: QuestionId) -> AppResult<Option<Question>> {
        let row = sqlx::query(
            r#"
            SELECT id, question_list_id, content, choices, answer
            FROM questions
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|row| Question {
            id: QuestionId::from(row.get::<Uuid, _>("id")),
            question_list_id: QuestionListId::from(row.get::<Uuid, _>("question_list_id")),
            content: row.get("content"),
            choices: row.get("choices"),
            answer: row.get("answer"),
        }))
    }

    #[instrument(skip(self))]
    async fn explanation_for_question(&self, id: QuestionId) -> AppResult<Option<Explanation>> {
        let row = sqlx::query("SELECT id, question_id, content FROM explanations WHERE question_id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|row| Explanation {
            id: ExplanationId::from(row.get::<Uuid, _>("id")),
            question_id: QuestionId::from(row.get::<Uuid, _>("question_id")),
            content: row.get("content"),
        }))
    }
}
