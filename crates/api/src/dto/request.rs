use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_guest_count: u32,
    #[serde(default)]
    pub guest_count: u32,
    pub host_id: i64,
    pub location_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CreateRequestRequest {
    pub guest_id: i64,
    pub event_id: i64,
    pub host_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerSurveyRequest {
    pub question_id: i64,
    pub answer: String,
}
