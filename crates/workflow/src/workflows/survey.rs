//! Live survey progression and answer collection.
//!
//! Every state change is followed by exactly one publish of the full survey
//! on its `SURVEY_UPDATE_<id>` topic. Delivery is fire-and-forget: a survey
//! nobody listens to still advances.

use rendezvous_domain::common::{SurveyIdentifier, SurveyQuestionIdentifier};
use rendezvous_domain::survey::{NewSurveyAnswer, Survey, SurveyAnswer};

use crate::errors::WorkflowError;
use crate::ports::{SurveyPublisher, SurveyRepository, WorkflowResult};

// =============================================================================
// Answer Survey
// =============================================================================

/// Stores an answer to `question` and broadcasts the updated survey.
///
/// The text is stored as given, empty answers included.
///
/// # Errors
///
/// Returns `WorkflowError::NotFound` if no survey owns the question.
pub async fn answer_survey<Surveys, Publisher>(
    surveys: &Surveys,
    publisher: &Publisher,
    question: SurveyQuestionIdentifier,
    answer: String,
) -> WorkflowResult<SurveyAnswer>
where
    Surveys: SurveyRepository,
    Publisher: SurveyPublisher,
{
    let new_answer = NewSurveyAnswer::new(question, answer);

    let mut survey = surveys
        .find_survey_by_question(question)
        .await?
        .ok_or_else(|| WorkflowError::not_found(SurveyQuestionIdentifier::ENTITY_TYPE, question))?;

    let stored = surveys.insert_answer(new_answer).await?;
    survey.record_answer(stored.clone())?;

    broadcast(publisher, &survey);
    Ok(stored)
}

// =============================================================================
// Next Survey Question
// =============================================================================

/// Moves the survey to its next question and broadcasts it.
///
/// The index goes `None -> 0 -> 1 -> ...` and stops at the question count,
/// which marks the survey finished. Each call publishes once, including
/// calls on a finished survey.
///
/// # Errors
///
/// Returns `WorkflowError::NotFound` if the survey does not exist.
pub async fn next_survey_question<Surveys, Publisher>(
    surveys: &Surveys,
    publisher: &Publisher,
    identifier: SurveyIdentifier,
) -> WorkflowResult<Survey>
where
    Surveys: SurveyRepository,
    Publisher: SurveyPublisher,
{
    let mut survey = surveys
        .find_survey(identifier)
        .await?
        .ok_or_else(|| WorkflowError::not_found(SurveyIdentifier::ENTITY_TYPE, identifier))?;

    let current = survey.advance();
    surveys.save_progress(&survey).await?;

    tracing::info!(
        survey = %identifier,
        current_question = ?current,
        finished = survey.is_finished(),
        "Survey advanced"
    );

    broadcast(publisher, &survey);
    Ok(survey)
}

fn broadcast<Publisher: SurveyPublisher>(publisher: &Publisher, survey: &Survey) {
    let topic = survey.topic();
    let listeners = publisher.publish(&topic, survey);
    tracing::debug!(topic = %topic, listeners, "Survey update published");
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeStore, RecordingPublisher, identifier};
    use rstest::rstest;

    mod next_question {
        use super::*;

        #[rstest]
        #[tokio::test]
        async fn fresh_survey_goes_to_zero_then_one() {
            let store = FakeStore::seeded();
            let survey = store.add_survey("Course feedback", 3);
            let publisher = RecordingPublisher::default();

            let first = next_survey_question(&store, &publisher, survey).await.unwrap();
            assert_eq!(first.current_question_index(), Some(0));
            assert_eq!(publisher.published().len(), 1);

            let second = next_survey_question(&store, &publisher, survey).await.unwrap();
            assert_eq!(second.current_question_index(), Some(1));
            assert_eq!(publisher.published().len(), 2);
            assert_eq!(store.survey(survey).current_question_index(), Some(1));
        }

        #[rstest]
        #[tokio::test]
        async fn publishes_on_the_survey_topic() {
            let store = FakeStore::seeded();
            let survey = store.add_survey("Course feedback", 1);
            let publisher = RecordingPublisher::default();

            let advanced = next_survey_question(&store, &publisher, survey).await.unwrap();

            let published = publisher.published();
            assert_eq!(published[0].0.as_str(), format!("SURVEY_UPDATE_{survey}"));
            assert_eq!(published[0].1, advanced);
        }

        #[rstest]
        #[tokio::test]
        async fn stops_at_question_count() {
            let store = FakeStore::seeded();
            let survey = store.add_survey("Quick poll", 2);
            let publisher = RecordingPublisher::default();

            for _ in 0..5 {
                next_survey_question(&store, &publisher, survey).await.unwrap();
            }

            let stored = store.survey(survey);
            assert_eq!(stored.current_question_index(), Some(2));
            assert!(stored.is_finished());
            assert_eq!(publisher.published().len(), 5);
        }

        #[rstest]
        #[tokio::test]
        async fn missing_survey_is_not_found_and_publishes_nothing() {
            let store = FakeStore::seeded();
            let publisher = RecordingPublisher::default();

            let error = next_survey_question(&store, &publisher, identifier(404))
                .await
                .unwrap_err();

            assert!(error.is_not_found());
            assert!(publisher.published().is_empty());
        }
    }

    mod answer {
        use super::*;

        #[rstest]
        #[tokio::test]
        async fn answer_is_stored_and_broadcast() {
            let store = FakeStore::seeded();
            let survey = store.add_survey("Course feedback", 2);
            let question = store.survey(survey).questions()[1].identifier;
            let publisher = RecordingPublisher::default();

            let answer = answer_survey(&store, &publisher, question, "Yes".to_owned())
                .await
                .unwrap();

            assert_eq!(answer.question(), question);
            assert_eq!(answer.answer(), "Yes");
            let published = publisher.published();
            assert_eq!(published.len(), 1);
            assert_eq!(published[0].1.questions()[1].answers, vec![answer.clone()]);
            assert_eq!(store.survey(survey).questions()[1].answers, vec![answer]);
        }

        #[rstest]
        #[tokio::test]
        async fn unknown_question_is_not_found() {
            let store = FakeStore::seeded();
            let publisher = RecordingPublisher::default();

            let error = answer_survey(&store, &publisher, identifier(404), "Yes".to_owned())
                .await
                .unwrap_err();

            assert!(error.is_not_found());
            assert!(publisher.published().is_empty());
        }

        #[rstest]
        #[tokio::test]
        async fn empty_answer_is_stored_and_published() {
            let store = FakeStore::seeded();
            let survey = store.add_survey("Course feedback", 1);
            let question = store.survey(survey).questions()[0].identifier;
            let publisher = RecordingPublisher::default();

            let stored = answer_survey(&store, &publisher, question, String::new())
                .await
                .unwrap();

            assert_eq!(stored.answer(), "");
            assert_eq!(store.survey(survey).questions()[0].answers, vec![stored]);
            let published = publisher.published();
            assert_eq!(published.len(), 1);
            assert_eq!(published[0].1.questions()[0].answers[0].answer(), "");
        }
    }
}
