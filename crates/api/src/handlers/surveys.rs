use std::convert::Infallible;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use rendezvous_domain::common::SurveyIdentifier;
use rendezvous_domain::survey::{Survey, SurveyAnswer, SurveyTopic};
use rendezvous_workflow::ports::{Clock, EphemeralCache};
use rendezvous_workflow::workflows::{self, directory};

use super::identifier;
use crate::dto::request::AnswerSurveyRequest;
use crate::errors::ApiError;
use crate::state::{AppState, RecordStore};

pub async fn answer_survey<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Json(request): Json<AnswerSurveyRequest>,
) -> Result<(StatusCode, Json<SurveyAnswer>), ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let answer = workflows::answer_survey(
        state.store(),
        state.topics(),
        identifier("question_id", request.question_id)?,
        request.answer,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(answer)))
}

pub async fn next_survey_question<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(survey_id): Path<i64>,
) -> Result<Json<Survey>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let survey = workflows::next_survey_question(
        state.store(),
        state.topics(),
        identifier("survey_id", survey_id)?,
    )
    .await?;
    Ok(Json(survey))
}

/// Server-sent events carrying the full survey after every change.
///
/// The current state is sent first so a late listener does not have to wait
/// for the next change.
pub async fn survey_updates<Store, Cache, Time>(
    State(state): State<AppState<Store, Cache, Time>>,
    Path(survey_id): Path<i64>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError>
where
    Store: RecordStore,
    Cache: EphemeralCache,
    Time: Clock,
{
    let survey_id: SurveyIdentifier = identifier("survey_id", survey_id)?;
    let topic = SurveyTopic::for_survey(survey_id);
    // Subscribe before reading so no change between the two is lost.
    let subscription = state.topics().subscribe(&topic);
    let current = directory::survey(state.store(), survey_id)
        .await?
        .ok_or_else(|| ApiError::not_found(SurveyIdentifier::ENTITY_TYPE, survey_id))?;

    let name = topic.to_string();
    let updates = futures::stream::once(async move { current })
        .chain(subscription.into_stream())
        .filter_map(move |survey| {
            let event = Event::default().event(name.clone()).json_data(&survey);
            async move {
                match event {
                    Ok(event) => Some(Ok(event)),
                    Err(error) => {
                        tracing::warn!("Dropping survey update: {}", error);
                        None
                    }
                }
            }
        });

    Ok(Sse::new(updates).keep_alive(KeepAlive::default()))
}
