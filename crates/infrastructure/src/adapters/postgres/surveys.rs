use std::collections::HashMap;

use rendezvous_domain::common::{
    SurveyAnswerIdentifier, SurveyIdentifier, SurveyQuestionIdentifier,
};
use rendezvous_domain::survey::{NewSurveyAnswer, Survey, SurveyAnswer, SurveyQuestion};
use rendezvous_workflow::errors::WorkflowError;
use rendezvous_workflow::ports::{SurveyRepository, WorkflowResult};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use super::store::{PostgresRecordStore, failure};
use crate::errors::InfraError;

/// Loads the listed surveys (all surveys for `None`) with their questions in
/// position order and each question's answers in insertion order.
async fn load_surveys(
    pool: &PgPool,
    identifiers: Option<&[i64]>,
) -> Result<Vec<Survey>, InfraError> {
    // Step 1: survey rows [IO]
    let survey_rows = match identifiers {
        Some(identifiers) => {
            sqlx::query(
                "SELECT id, name, curr_question FROM surveys WHERE id = ANY($1) ORDER BY id",
            )
            .bind(identifiers)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query("SELECT id, name, curr_question FROM surveys ORDER BY id")
                .fetch_all(pool)
                .await?
        }
    };
    if survey_rows.is_empty() {
        return Ok(Vec::new());
    }
    let survey_ids = survey_rows
        .iter()
        .map(|row| row.try_get::<i64, _>("id"))
        .collect::<Result<Vec<_>, _>>()?;

    // Step 2: questions and answers of those surveys [IO]
    let question_rows = sqlx::query(
        "SELECT id, survey_id, prompt, choices FROM survey_questions \
         WHERE survey_id = ANY($1) ORDER BY survey_id, position",
    )
    .bind(&survey_ids)
    .fetch_all(pool)
    .await?;
    let answer_rows = sqlx::query(
        "SELECT a.id, a.question_id, a.answer FROM survey_answers a \
         JOIN survey_questions q ON q.id = a.question_id \
         WHERE q.survey_id = ANY($1) ORDER BY a.id",
    )
    .bind(&survey_ids)
    .fetch_all(pool)
    .await?;

    // Step 3: assemble [Pure]
    let mut answers: HashMap<SurveyQuestionIdentifier, Vec<SurveyAnswer>> = HashMap::new();
    for row in &answer_rows {
        let question = SurveyQuestionIdentifier::new(row.try_get("question_id")?)?;
        answers.entry(question).or_default().push(SurveyAnswer::reconstruct(
            SurveyAnswerIdentifier::new(row.try_get("id")?)?,
            question,
            row.try_get::<String, _>("answer")?,
        ));
    }

    let mut questions: HashMap<SurveyIdentifier, Vec<SurveyQuestion>> = HashMap::new();
    for row in &question_rows {
        let survey = SurveyIdentifier::new(row.try_get("survey_id")?)?;
        let Json(choices): Json<Vec<String>> = row.try_get("choices")?;
        let mut question = SurveyQuestion::new(
            SurveyQuestionIdentifier::new(row.try_get("id")?)?,
            survey,
            row.try_get::<String, _>("prompt")?,
            choices,
        );
        question.answers = answers.remove(&question.identifier).unwrap_or_default();
        questions.entry(survey).or_default().push(question);
    }

    survey_rows
        .iter()
        .map(|row| {
            let identifier = SurveyIdentifier::new(row.try_get("id")?)?;
            let current_question = row
                .try_get::<Option<i32>, _>("curr_question")?
                .map(|index| {
                    u32::try_from(index).map_err(|_| {
                        InfraError::integrity("Survey", format!("negative question index {index}"))
                    })
                })
                .transpose()?;
            Ok(Survey::reconstruct(
                identifier,
                row.try_get::<String, _>("name")?,
                current_question,
                questions.remove(&identifier).unwrap_or_default(),
            ))
        })
        .collect()
}

impl SurveyRepository for PostgresRecordStore {
    async fn find_survey(&self, identifier: SurveyIdentifier) -> WorkflowResult<Option<Survey>> {
        let surveys = load_surveys(self.pool().as_inner(), Some(&[identifier.value()]))
            .await
            .map_err(failure("find_survey"))?;
        Ok(surveys.into_iter().next())
    }

    async fn list_surveys(&self) -> WorkflowResult<Vec<Survey>> {
        load_surveys(self.pool().as_inner(), None)
            .await
            .map_err(failure("list_surveys"))
    }

    async fn find_survey_by_question(
        &self,
        question: SurveyQuestionIdentifier,
    ) -> WorkflowResult<Option<Survey>> {
        let pool = self.pool().as_inner();
        let survey: Option<i64> =
            sqlx::query_scalar("SELECT survey_id FROM survey_questions WHERE id = $1")
                .bind(question.value())
                .fetch_optional(pool)
                .await
                .map_err(failure("find_survey_by_question"))?;

        let Some(survey) = survey else {
            return Ok(None);
        };
        let surveys = load_surveys(pool, Some(&[survey]))
            .await
            .map_err(failure("find_survey_by_question"))?;
        Ok(surveys.into_iter().next())
    }

    async fn insert_answer(&self, answer: NewSurveyAnswer) -> WorkflowResult<SurveyAnswer> {
        let identifier: Option<i64> = sqlx::query_scalar(
            "INSERT INTO survey_answers (question_id, answer) \
             SELECT q.id, $2 FROM survey_questions q WHERE q.id = $1 \
             RETURNING id",
        )
        .bind(answer.question.value())
        .bind(&answer.answer)
        .fetch_optional(self.pool().as_inner())
        .await
        .map_err(failure("insert_answer"))?;

        let Some(identifier) = identifier else {
            return Err(WorkflowError::not_found(
                SurveyQuestionIdentifier::ENTITY_TYPE,
                answer.question,
            ));
        };
        let identifier =
            SurveyAnswerIdentifier::new(identifier).map_err(failure("insert_answer"))?;
        Ok(answer.into_answer(identifier))
    }

    async fn save_progress(&self, survey: &Survey) -> WorkflowResult<()> {
        let index = survey
            .current_question_index()
            .map(|index| {
                i32::try_from(index).map_err(|_| {
                    InfraError::integrity("Survey", format!("question index {index} is too large"))
                })
            })
            .transpose()
            .map_err(failure("save_progress"))?;

        let result = sqlx::query("UPDATE surveys SET curr_question = $2 WHERE id = $1")
            .bind(survey.identifier().value())
            .bind(index)
            .execute(self.pool().as_inner())
            .await
            .map_err(failure("save_progress"))?;

        if result.rows_affected() == 0 {
            return Err(WorkflowError::not_found(
                SurveyIdentifier::ENTITY_TYPE,
                survey.identifier(),
            ));
        }
        Ok(())
    }
}
