//! Live surveys.
//!
//! A survey is an ordered list of questions advanced one at a time by an
//! administrator while participants submit answers. Answers are append-only.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::{
    DomainError, SurveyAnswerIdentifier, SurveyIdentifier, SurveyQuestionIdentifier,
};

// =============================================================================
// SurveyAnswer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyAnswer {
    identifier: SurveyAnswerIdentifier,
    question: SurveyQuestionIdentifier,
    answer: String,
}

impl SurveyAnswer {
    #[must_use]
    pub fn reconstruct(
        identifier: SurveyAnswerIdentifier,
        question: SurveyQuestionIdentifier,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            identifier,
            question,
            answer: answer.into(),
        }
    }

    #[must_use]
    pub const fn identifier(&self) -> SurveyAnswerIdentifier {
        self.identifier
    }

    #[must_use]
    pub const fn question(&self) -> SurveyQuestionIdentifier {
        self.question
    }

    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }
}

/// An answer that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSurveyAnswer {
    pub question: SurveyQuestionIdentifier,
    pub answer: String,
}

impl NewSurveyAnswer {
    /// Any text is accepted, including an empty string.
    #[must_use]
    pub fn new(question: SurveyQuestionIdentifier, answer: impl Into<String>) -> Self {
        Self {
            question,
            answer: answer.into(),
        }
    }

    #[must_use]
    pub fn into_answer(self, identifier: SurveyAnswerIdentifier) -> SurveyAnswer {
        SurveyAnswer {
            identifier,
            question: self.question,
            answer: self.answer,
        }
    }
}

// =============================================================================
// SurveyQuestion
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyQuestion {
    pub identifier: SurveyQuestionIdentifier,
    pub survey: SurveyIdentifier,
    pub prompt: String,
    pub choices: Vec<String>,
    pub answers: Vec<SurveyAnswer>,
}

impl SurveyQuestion {
    #[must_use]
    pub fn new(
        identifier: SurveyQuestionIdentifier,
        survey: SurveyIdentifier,
        prompt: impl Into<String>,
        choices: Vec<String>,
    ) -> Self {
        Self {
            identifier,
            survey,
            prompt: prompt.into(),
            choices,
            answers: Vec::new(),
        }
    }
}

// =============================================================================
// Survey
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Survey {
    identifier: SurveyIdentifier,
    name: String,
    current_question: Option<u32>,
    questions: Vec<SurveyQuestion>,
}

impl Survey {
    #[must_use]
    pub fn reconstruct(
        identifier: SurveyIdentifier,
        name: impl Into<String>,
        current_question: Option<u32>,
        questions: Vec<SurveyQuestion>,
    ) -> Self {
        Self {
            identifier,
            name: name.into(),
            current_question,
            questions,
        }
    }

    #[must_use]
    pub const fn identifier(&self) -> SurveyIdentifier {
        self.identifier
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `None` before the first question is shown.
    #[must_use]
    pub const fn current_question_index(&self) -> Option<u32> {
        self.current_question
    }

    #[must_use]
    pub fn questions(&self) -> &[SurveyQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&SurveyQuestion> {
        self.current_question
            .and_then(|index| self.questions.get(index as usize))
    }

    /// True once the index has moved past the last question.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current_question
            .is_some_and(|index| index as usize >= self.questions.len())
    }

    #[must_use]
    pub fn topic(&self) -> SurveyTopic {
        SurveyTopic::for_survey(self.identifier)
    }

    /// Moves to the next question: `None -> 0`, `n -> n + 1`.
    ///
    /// The index stops at the question count, which marks the survey as
    /// finished; advancing a finished survey leaves it unchanged.
    pub fn advance(&mut self) -> Option<u32> {
        let question_count = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        let next = match self.current_question {
            None => 0,
            Some(index) => index.saturating_add(1).min(question_count),
        };
        self.current_question = Some(next);
        self.current_question
    }

    /// Appends a stored answer to the question it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` when the question is not part of
    /// this survey.
    pub fn record_answer(&mut self, answer: SurveyAnswer) -> Result<(), DomainError> {
        let question = self
            .questions
            .iter_mut()
            .find(|question| question.identifier == answer.question())
            .ok_or_else(|| {
                DomainError::validation(
                    "question",
                    format!(
                        "question {} does not belong to survey {}",
                        answer.question(),
                        self.identifier
                    ),
                )
            })?;
        question.answers.push(answer);
        Ok(())
    }
}

// =============================================================================
// SurveyTopic
// =============================================================================

/// Broadcast topic name carrying updates of one survey.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurveyTopic(String);

impl SurveyTopic {
    pub const PREFIX: &'static str = "SURVEY_UPDATE_";

    #[must_use]
    pub fn for_survey(identifier: SurveyIdentifier) -> Self {
        Self(format!("{}{}", Self::PREFIX, identifier))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SurveyTopic {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn question(identifier: i64) -> SurveyQuestion {
        SurveyQuestion::new(
            SurveyQuestionIdentifier::new(identifier).unwrap(),
            SurveyIdentifier::new(1).unwrap(),
            format!("Question {identifier}"),
            vec!["Yes".to_string(), "No".to_string()],
        )
    }

    #[fixture]
    fn survey() -> Survey {
        Survey::reconstruct(
            SurveyIdentifier::new(1).unwrap(),
            "Orientation",
            None,
            vec![question(10), question(11)],
        )
    }

    mod advance {
        use super::*;

        #[rstest]
        fn starts_at_zero(mut survey: Survey) {
            assert_eq!(survey.current_question_index(), None);
            assert_eq!(survey.advance(), Some(0));
            assert_eq!(
                survey.current_question().map(|question| question.identifier.value()),
                Some(10)
            );
        }

        #[rstest]
        fn moves_forward_one_step(mut survey: Survey) {
            survey.advance();
            assert_eq!(survey.advance(), Some(1));
            assert!(!survey.is_finished());
        }

        #[rstest]
        fn clamps_at_question_count(mut survey: Survey) {
            for _ in 0..5 {
                survey.advance();
            }
            assert_eq!(survey.current_question_index(), Some(2));
            assert!(survey.is_finished());
            assert!(survey.current_question().is_none());
        }

        #[rstest]
        fn survey_without_questions_finishes_immediately() {
            let mut empty =
                Survey::reconstruct(SurveyIdentifier::new(2).unwrap(), "Empty", None, vec![]);
            assert_eq!(empty.advance(), Some(0));
            assert!(empty.is_finished());
        }
    }

    mod answers {
        use super::*;

        #[rstest]
        fn blank_answer_is_kept_verbatim() {
            let answer = NewSurveyAnswer::new(SurveyQuestionIdentifier::new(10).unwrap(), "   ");
            assert_eq!(answer.answer, "   ");
        }

        #[rstest]
        fn record_answer_appends_to_matching_question(mut survey: Survey) {
            let answer = NewSurveyAnswer::new(SurveyQuestionIdentifier::new(11).unwrap(), "Yes")
                .into_answer(SurveyAnswerIdentifier::new(100).unwrap());

            survey.record_answer(answer.clone()).unwrap();

            assert!(survey.questions()[0].answers.is_empty());
            assert_eq!(survey.questions()[1].answers, vec![answer]);
        }

        #[rstest]
        fn record_answer_for_foreign_question_fails(mut survey: Survey) {
            let answer = SurveyAnswer::reconstruct(
                SurveyAnswerIdentifier::new(1).unwrap(),
                SurveyQuestionIdentifier::new(99).unwrap(),
                "Maybe",
            );
            assert!(survey.record_answer(answer).is_err());
        }
    }

    #[rstest]
    fn topic_is_keyed_by_survey_identifier(survey: Survey) {
        assert_eq!(survey.topic().as_str(), "SURVEY_UPDATE_1");
    }
}
