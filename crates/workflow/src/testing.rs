//! In-process fakes for the workflow ports.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rendezvous_domain::common::{
    BuildingIdentifier, EventIdentifier, LocationIdentifier, RequestIdentifier,
    SurveyAnswerIdentifier, SurveyIdentifier, SurveyQuestionIdentifier, UserIdentifier,
};
use rendezvous_domain::event::{Event, EventStatus, NewEvent};
use rendezvous_domain::request::{NewRequest, Request, RequestStatus};
use rendezvous_domain::survey::{NewSurveyAnswer, Survey, SurveyAnswer, SurveyQuestion, SurveyTopic};
use rendezvous_domain::user::{User, UserType};
use rendezvous_domain::venue::{Building, Location};

use crate::errors::WorkflowError;
use crate::ports::{
    AcceptanceOutcome, Clock, EphemeralCache, EventRepository, RequestRepository,
    SurveyPublisher, SurveyRepository, UserRepository, VenueRepository, WorkflowResult,
};
use crate::views::{
    ActiveEvent, BuildingDetails, EventDetails, EventRequest, GuestRequest, HostRequest,
    JoinedEvent, RequestContext, RequestWithGuest, SitedEvent, UserProfile,
};

pub fn identifier<T>(value: i64) -> T
where
    T: TryFrom<i64>,
    T::Error: Debug,
{
    T::try_from(value).unwrap()
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn with_status(event: &Event, status: EventStatus) -> Event {
    Event::reconstruct(
        event.identifier(),
        event.title().to_owned(),
        event.description().to_owned(),
        event.start_time(),
        event.end_time(),
        event.max_guest_count(),
        event.guest_count(),
        status,
        event.host(),
        event.location(),
    )
    .unwrap()
}

// =============================================================================
// FakeStore
// =============================================================================

#[derive(Default)]
struct StoreState {
    users: BTreeMap<UserIdentifier, User>,
    buildings: BTreeMap<BuildingIdentifier, Building>,
    locations: BTreeMap<LocationIdentifier, Location>,
    events: BTreeMap<EventIdentifier, Event>,
    requests: BTreeMap<RequestIdentifier, Request>,
    joined: BTreeSet<(UserIdentifier, EventIdentifier)>,
    surveys: BTreeMap<SurveyIdentifier, Survey>,
    next_identifier: i64,
    open_event_queries: usize,
    transition_calls: usize,
    close_calls: usize,
}

impl StoreState {
    fn allocate(&mut self) -> i64 {
        self.next_identifier += 1;
        self.next_identifier
    }

    fn sited(&self, event: &Event) -> Option<SitedEvent> {
        let location = self.locations.get(&event.location())?.clone();
        let building = self.buildings.get(&location.building)?.clone();
        Some(SitedEvent {
            event: event.clone(),
            location,
            building,
        })
    }

    fn user(&self, identifier: UserIdentifier) -> Option<User> {
        self.users.get(&identifier).cloned()
    }
}

#[derive(Clone, Default)]
pub struct FakeStore {
    state: Arc<Mutex<StoreState>>,
    yielding_reads: bool,
}

impl FakeStore {
    /// Users 1 (admin) to 3, building 1 with location 1, and an empty
    /// building 2.
    pub fn seeded() -> Self {
        let store = Self::default();
        {
            let mut state = store.state.lock();
            state.next_identifier = 100;
            for (id, name, user_type) in [
                (1, "Ada", UserType::Admin),
                (2, "Grace", UserType::Student),
                (3, "Linus", UserType::Student),
            ] {
                let user = User::new(
                    identifier(id),
                    name,
                    format!("{}@campus.test", name.to_lowercase()),
                    user_type,
                );
                state.users.insert(user.identifier, user);
            }
            state
                .buildings
                .insert(identifier(1), Building::new(identifier(1), "Library"));
            state
                .buildings
                .insert(identifier(2), Building::new(identifier(2), "Gym"));
            state.locations.insert(
                identifier(1),
                Location::new(identifier(1), "Reading Room", identifier(1)),
            );
        }
        store
    }

    /// Yields to the scheduler after each request-context read so that
    /// concurrent callers interleave between reading and writing.
    pub fn with_yielding_reads(mut self) -> Self {
        self.yielding_reads = true;
        self
    }

    pub fn add_event(&self, host: i64, guest_count: u32, max_guest_count: u32) -> EventIdentifier {
        self.add_event_ending(
            host,
            guest_count,
            max_guest_count,
            fixed_now() + chrono::Duration::hours(2),
        )
    }

    pub fn add_event_ending(
        &self,
        host: i64,
        guest_count: u32,
        max_guest_count: u32,
        end_time: DateTime<Utc>,
    ) -> EventIdentifier {
        let mut state = self.state.lock();
        let event_identifier = identifier(state.allocate());
        let event = NewEvent::new(
            "Study group",
            "Weekly session",
            end_time - chrono::Duration::hours(1),
            end_time,
            max_guest_count,
            guest_count,
            identifier(host),
            identifier(1),
        )
        .unwrap()
        .into_event(event_identifier);
        state.events.insert(event_identifier, event);
        event_identifier
    }

    pub fn add_request(&self, guest: i64, event: EventIdentifier) -> RequestIdentifier {
        let mut state = self.state.lock();
        let host = state.events[&event].host();
        let request_identifier = identifier(state.allocate());
        let request =
            NewRequest::new(identifier(guest), host, event).into_request(request_identifier);
        state.requests.insert(request_identifier, request);
        request_identifier
    }

    pub fn add_survey(&self, name: &str, question_count: usize) -> SurveyIdentifier {
        let mut state = self.state.lock();
        let survey_identifier: SurveyIdentifier = identifier(state.allocate());
        let questions = (0..question_count)
            .map(|index| {
                SurveyQuestion::new(
                    identifier(state.allocate()),
                    survey_identifier,
                    format!("Question {}", index + 1),
                    vec!["Yes".to_owned(), "No".to_owned()],
                )
            })
            .collect();
        state.surveys.insert(
            survey_identifier,
            Survey::reconstruct(survey_identifier, name, None, questions),
        );
        survey_identifier
    }

    pub fn set_status(&self, event: EventIdentifier, status: EventStatus) {
        let mut state = self.state.lock();
        let updated = with_status(&state.events[&event], status);
        state.events.insert(event, updated);
    }

    pub fn event(&self, event: EventIdentifier) -> Event {
        self.state.lock().events[&event].clone()
    }

    pub fn request(&self, request: RequestIdentifier) -> Request {
        self.state.lock().requests[&request]
    }

    pub fn survey(&self, survey: SurveyIdentifier) -> Survey {
        self.state.lock().surveys[&survey].clone()
    }

    pub fn has_joined(&self, user: UserIdentifier, event: EventIdentifier) -> bool {
        self.state.lock().joined.contains(&(user, event))
    }

    pub fn open_event_queries(&self) -> usize {
        self.state.lock().open_event_queries
    }

    pub fn transition_calls(&self) -> usize {
        self.state.lock().transition_calls
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().close_calls
    }
}

impl UserRepository for FakeStore {
    async fn find_user(&self, identifier: UserIdentifier) -> WorkflowResult<Option<User>> {
        Ok(self.state.lock().user(identifier))
    }

    async fn find_profile(
        &self,
        identifier: UserIdentifier,
    ) -> WorkflowResult<Option<UserProfile>> {
        let state = self.state.lock();
        let Some(user) = state.user(identifier) else {
            return Ok(None);
        };
        let host_events = state
            .events
            .values()
            .filter(|event| event.host() == identifier)
            .filter_map(|event| state.sited(event))
            .collect();
        let guest_events = state
            .joined
            .iter()
            .filter(|(guest, _)| *guest == identifier)
            .filter_map(|(_, event)| {
                let event = state.events.get(event)?;
                Some(JoinedEvent {
                    event: state.sited(event)?,
                    host: state.user(event.host())?,
                })
            })
            .collect();
        Ok(Some(UserProfile {
            user,
            host_events,
            guest_events,
        }))
    }
}

impl VenueRepository for FakeStore {
    async fn find_location(
        &self,
        identifier: LocationIdentifier,
    ) -> WorkflowResult<Option<Location>> {
        Ok(self.state.lock().locations.get(&identifier).cloned())
    }

    async fn find_building(
        &self,
        identifier: BuildingIdentifier,
    ) -> WorkflowResult<Option<BuildingDetails>> {
        let state = self.state.lock();
        Ok(state.buildings.get(&identifier).map(|building| BuildingDetails {
            building: building.clone(),
            locations: state
                .locations
                .values()
                .filter(|location| location.building == identifier)
                .cloned()
                .collect(),
        }))
    }

    async fn list_buildings(&self) -> WorkflowResult<Vec<Building>> {
        Ok(self.state.lock().buildings.values().cloned().collect())
    }
}

impl EventRepository for FakeStore {
    async fn find_event(&self, identifier: EventIdentifier) -> WorkflowResult<Option<Event>> {
        Ok(self.state.lock().events.get(&identifier).cloned())
    }

    async fn find_event_details(
        &self,
        identifier: EventIdentifier,
    ) -> WorkflowResult<Option<EventDetails>> {
        let state = self.state.lock();
        Ok(state.events.get(&identifier).and_then(|event| {
            let sited = state.sited(event)?;
            Some(EventDetails {
                event: sited.event,
                host: state.user(event.host())?,
                location: sited.location,
                building: sited.building,
            })
        }))
    }

    async fn find_open_events(&self) -> WorkflowResult<Vec<ActiveEvent>> {
        let mut state = self.state.lock();
        state.open_event_queries += 1;
        let state = &*state;
        Ok(state
            .events
            .values()
            .filter(|event| event.status().is_open())
            .filter_map(|event| {
                let sited = state.sited(event)?;
                let requests = state
                    .requests
                    .values()
                    .filter(|request| request.event() == event.identifier())
                    .filter_map(|request| {
                        Some(RequestWithGuest {
                            request: *request,
                            guest: state.user(request.guest())?,
                        })
                    })
                    .collect();
                Some(ActiveEvent {
                    event: sited.event,
                    host: state.user(event.host())?,
                    location: sited.location,
                    building: sited.building,
                    requests,
                })
            })
            .collect())
    }

    async fn insert_event(&self, event: NewEvent) -> WorkflowResult<Event> {
        let mut state = self.state.lock();
        let event = event.into_event(identifier(state.allocate()));
        state.events.insert(event.identifier(), event.clone());
        Ok(event)
    }

    async fn transition_status(
        &self,
        identifier: EventIdentifier,
        from: EventStatus,
        to: EventStatus,
    ) -> WorkflowResult<bool> {
        let mut state = self.state.lock();
        state.transition_calls += 1;
        let Some(event) = state.events.get(&identifier) else {
            return Ok(false);
        };
        if event.status() != from {
            return Ok(false);
        }
        let updated = with_status(event, to);
        state.events.insert(identifier, updated);
        Ok(true)
    }

    async fn close_events(&self, identifiers: &[EventIdentifier]) -> WorkflowResult<u64> {
        let mut state = self.state.lock();
        state.close_calls += 1;
        let mut rows = 0;
        for identifier in identifiers {
            let Some(event) = state.events.get(identifier) else {
                continue;
            };
            if event.status().is_open() {
                let updated = with_status(event, EventStatus::Closed);
                state.events.insert(*identifier, updated);
                rows += 1;
            }
        }
        Ok(rows)
    }
}

impl RequestRepository for FakeStore {
    async fn find_request(&self, identifier: RequestIdentifier) -> WorkflowResult<Option<Request>> {
        Ok(self.state.lock().requests.get(&identifier).copied())
    }

    async fn find_request_context(
        &self,
        identifier: RequestIdentifier,
    ) -> WorkflowResult<Option<RequestContext>> {
        let context = {
            let state = self.state.lock();
            state.requests.get(&identifier).and_then(|request| {
                Some(RequestContext {
                    request: *request,
                    event: state.events.get(&request.event())?.clone(),
                    guest: state.user(request.guest())?,
                })
            })
        };
        if self.yielding_reads {
            tokio::task::yield_now().await;
        }
        Ok(context)
    }

    async fn insert_request(&self, request: NewRequest) -> WorkflowResult<Request> {
        let mut state = self.state.lock();
        let request = request.into_request(identifier(state.allocate()));
        state.requests.insert(request.identifier(), request);
        Ok(request)
    }

    async fn save_request(&self, request: &Request) -> WorkflowResult<()> {
        let mut state = self.state.lock();
        let Some(stored) = state.requests.get(&request.identifier()) else {
            return Err(WorkflowError::not_found("Request", request.identifier()));
        };
        if !stored.status().is_pending() && stored.status() != request.status() {
            return Err(WorkflowError::conflict("request already decided"));
        }
        state.requests.insert(request.identifier(), *request);
        Ok(())
    }

    async fn accept_request(&self, request: &Request) -> WorkflowResult<AcceptanceOutcome> {
        let mut state = self.state.lock();
        let Some(mut stored) = state.requests.get(&request.identifier()).copied() else {
            return Err(WorkflowError::not_found("Request", request.identifier()));
        };
        if stored.status() != RequestStatus::Pending {
            return Ok(AcceptanceOutcome::NoLongerPending);
        }
        let Some(mut event) = state.events.get(&stored.event()).cloned() else {
            return Err(WorkflowError::not_found("Event", stored.event()));
        };

        if event.admit_guest().is_ok() {
            stored.accept()?;
            state.events.insert(event.identifier(), event);
            state.requests.insert(stored.identifier(), stored);
            state.joined.insert((stored.guest(), stored.event()));
            Ok(AcceptanceOutcome::Accepted)
        } else {
            stored.reject()?;
            state.requests.insert(stored.identifier(), stored);
            Ok(AcceptanceOutcome::CapacityReached)
        }
    }

    async fn find_host_requests(&self, host: UserIdentifier) -> WorkflowResult<Vec<HostRequest>> {
        let state = self.state.lock();
        Ok(state
            .requests
            .values()
            .filter(|request| request.host() == host && request.status().is_pending())
            .filter_map(|request| {
                Some(HostRequest {
                    request: *request,
                    event: state.sited(state.events.get(&request.event())?)?,
                    guest: state.user(request.guest())?,
                })
            })
            .collect())
    }

    async fn find_guest_requests(
        &self,
        guest: UserIdentifier,
    ) -> WorkflowResult<Vec<GuestRequest>> {
        let state = self.state.lock();
        Ok(state
            .requests
            .values()
            .filter(|request| request.guest() == guest)
            .filter_map(|request| {
                Some(GuestRequest {
                    request: *request,
                    event: state.sited(state.events.get(&request.event())?)?,
                    host: state.user(request.host())?,
                })
            })
            .collect())
    }

    async fn find_event_requests(
        &self,
        event: EventIdentifier,
    ) -> WorkflowResult<Vec<EventRequest>> {
        let state = self.state.lock();
        Ok(state
            .requests
            .values()
            .filter(|request| request.event() == event)
            .filter_map(|request| {
                Some(EventRequest {
                    request: *request,
                    host: state.user(request.host())?,
                    guest: state.user(request.guest())?,
                })
            })
            .collect())
    }
}

impl SurveyRepository for FakeStore {
    async fn find_survey(&self, identifier: SurveyIdentifier) -> WorkflowResult<Option<Survey>> {
        Ok(self.state.lock().surveys.get(&identifier).cloned())
    }

    async fn list_surveys(&self) -> WorkflowResult<Vec<Survey>> {
        Ok(self.state.lock().surveys.values().cloned().collect())
    }

    async fn find_survey_by_question(
        &self,
        question: SurveyQuestionIdentifier,
    ) -> WorkflowResult<Option<Survey>> {
        Ok(self
            .state
            .lock()
            .surveys
            .values()
            .find(|survey| {
                survey
                    .questions()
                    .iter()
                    .any(|candidate| candidate.identifier == question)
            })
            .cloned())
    }

    async fn insert_answer(&self, answer: NewSurveyAnswer) -> WorkflowResult<SurveyAnswer> {
        let mut state = self.state.lock();
        let answer_identifier: SurveyAnswerIdentifier = identifier(state.allocate());
        let answer = answer.into_answer(answer_identifier);
        let survey = state
            .surveys
            .values_mut()
            .find(|survey| {
                survey
                    .questions()
                    .iter()
                    .any(|question| question.identifier == answer.question())
            })
            .ok_or_else(|| WorkflowError::repository("insert_answer", "unknown question"))?;
        survey.record_answer(answer.clone())?;
        Ok(answer)
    }

    async fn save_progress(&self, survey: &Survey) -> WorkflowResult<()> {
        let mut state = self.state.lock();
        let stored = state
            .surveys
            .get(&survey.identifier())
            .ok_or_else(|| WorkflowError::repository("save_progress", "unknown survey"))?;
        let updated = Survey::reconstruct(
            stored.identifier(),
            stored.name(),
            survey.current_question_index(),
            stored.questions().to_vec(),
        );
        state.surveys.insert(survey.identifier(), updated);
        Ok(())
    }
}

// =============================================================================
// FakeCache
// =============================================================================

#[derive(Clone, Default)]
pub struct FakeCache {
    entries: Arc<Mutex<HashMap<String, (String, Duration)>>>,
    failing: bool,
}

impl FakeCache {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .insert(key.to_owned(), (value.to_owned(), Duration::from_secs(30)));
    }

    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).map(|(value, _)| value.clone())
    }

    pub fn time_to_live(&self, key: &str) -> Option<Duration> {
        self.entries.lock().get(key).map(|(_, ttl)| *ttl)
    }

    fn check(&self, operation: &str) -> WorkflowResult<()> {
        if self.failing {
            return Err(WorkflowError::cache(operation, "connection refused"));
        }
        Ok(())
    }
}

impl EphemeralCache for FakeCache {
    async fn get(&self, key: &str) -> WorkflowResult<Option<String>> {
        self.check("get")?;
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: String, time_to_live: Duration) -> WorkflowResult<()> {
        self.check("set")?;
        self.entries
            .lock()
            .insert(key.to_owned(), (value, time_to_live));
        Ok(())
    }

    async fn delete(&self, key: &str) -> WorkflowResult<()> {
        self.check("delete")?;
        self.entries.lock().remove(key);
        Ok(())
    }
}

// =============================================================================
// RecordingPublisher
// =============================================================================

#[derive(Clone, Default)]
pub struct RecordingPublisher {
    published: Arc<Mutex<Vec<(SurveyTopic, Survey)>>>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<(SurveyTopic, Survey)> {
        self.published.lock().clone()
    }
}

impl SurveyPublisher for RecordingPublisher {
    fn publish(&self, topic: &SurveyTopic, survey: &Survey) -> usize {
        self.published.lock().push((topic.clone(), survey.clone()));
        1
    }
}

// =============================================================================
// FakeClock
// =============================================================================

#[derive(Clone, Copy)]
pub struct FakeClock(pub DateTime<Utc>);

impl Default for FakeClock {
    fn default() -> Self {
        Self(fixed_now())
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
