use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;
use rendezvous_domain::common::{
    BuildingIdentifier, DomainError, EventIdentifier, LocationIdentifier, RequestIdentifier,
    SurveyAnswerIdentifier, SurveyIdentifier, SurveyQuestionIdentifier, UserIdentifier,
};
use rendezvous_domain::event::{Event, EventStatus, NewEvent};
use rendezvous_domain::request::{NewRequest, Request};
use rendezvous_domain::survey::{NewSurveyAnswer, Survey, SurveyAnswer, SurveyQuestion};
use rendezvous_domain::user::{User, UserType};
use rendezvous_domain::venue::{Building, Location};
use rendezvous_workflow::errors::WorkflowError;
use rendezvous_workflow::ports::{
    AcceptanceOutcome, EventRepository, RequestRepository, SurveyRepository, UserRepository,
    VenueRepository, WorkflowResult,
};
use rendezvous_workflow::views::{
    ActiveEvent, BuildingDetails, EventDetails, EventRequest, GuestRequest, HostRequest,
    JoinedEvent, RequestContext, RequestWithGuest, SitedEvent, UserProfile,
};

// =============================================================================
// Tables
// =============================================================================

#[derive(Debug, Default)]
struct Sequence(i64);

impl Sequence {
    fn next<T>(&mut self) -> Result<T, DomainError>
    where
        T: TryFrom<i64, Error = DomainError>,
    {
        self.0 += 1;
        T::try_from(self.0)
    }
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserIdentifier, User>,
    buildings: BTreeMap<BuildingIdentifier, Building>,
    locations: BTreeMap<LocationIdentifier, Location>,
    events: BTreeMap<EventIdentifier, Event>,
    guest_events: BTreeSet<(UserIdentifier, EventIdentifier)>,
    requests: BTreeMap<RequestIdentifier, Request>,
    surveys: BTreeMap<SurveyIdentifier, Survey>,
    user_sequence: Sequence,
    building_sequence: Sequence,
    location_sequence: Sequence,
    event_sequence: Sequence,
    request_sequence: Sequence,
    survey_sequence: Sequence,
    question_sequence: Sequence,
    answer_sequence: Sequence,
}

impl Tables {
    fn user(&self, identifier: UserIdentifier) -> Option<User> {
        self.users.get(&identifier).cloned()
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

    fn survey_owning(&self, question: SurveyQuestionIdentifier) -> Option<SurveyIdentifier> {
        self.surveys
            .values()
            .find(|survey| {
                survey
                    .questions()
                    .iter()
                    .any(|candidate| candidate.identifier == question)
            })
            .map(Survey::identifier)
    }

    fn replace_status(
        &mut self,
        identifier: EventIdentifier,
        status: EventStatus,
    ) -> WorkflowResult<()> {
        let Some(event) = self.events.get(&identifier) else {
            return Ok(());
        };
        let updated = Event::reconstruct(
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
        )?;
        self.events.insert(identifier, updated);
        Ok(())
    }
}

// =============================================================================
// InMemoryRecordStore
// =============================================================================

/// Record store kept in process memory.
///
/// Every repository operation runs under a single lock, so the guarded
/// acceptance is atomic in the same way as the PostgreSQL transaction.
/// Data does not survive a restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// =============================================================================
// Seeding
// =============================================================================

impl InMemoryRecordStore {
    /// # Errors
    ///
    /// Returns `DomainError` if the identifier space is exhausted.
    pub fn insert_user(
        &self,
        name: impl Into<String>,
        email: impl Into<String>,
        user_type: UserType,
    ) -> Result<User, DomainError> {
        let mut tables = self.tables.write();
        let user = User::new(tables.user_sequence.next()?, name, email, user_type);
        tables.users.insert(user.identifier, user.clone());
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `DomainError` if the identifier space is exhausted.
    pub fn insert_building(&self, name: impl Into<String>) -> Result<Building, DomainError> {
        let mut tables = self.tables.write();
        let building = Building::new(tables.building_sequence.next()?, name);
        tables.buildings.insert(building.identifier, building.clone());
        Ok(building)
    }

    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the building does not exist.
    pub fn insert_location(
        &self,
        name: impl Into<String>,
        building: BuildingIdentifier,
    ) -> Result<Location, DomainError> {
        let mut tables = self.tables.write();
        if !tables.buildings.contains_key(&building) {
            return Err(DomainError::validation(
                "building",
                format!("building {building} does not exist"),
            ));
        }
        let location = Location::new(tables.location_sequence.next()?, name, building);
        tables.locations.insert(location.identifier, location.clone());
        Ok(location)
    }

    /// Creates a survey that has not started, with one question per
    /// `(prompt, choices)` pair in order.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if the identifier space is exhausted.
    pub fn insert_survey(
        &self,
        name: impl Into<String>,
        questions: Vec<(String, Vec<String>)>,
    ) -> Result<Survey, DomainError> {
        let mut tables = self.tables.write();
        let identifier: SurveyIdentifier = tables.survey_sequence.next()?;
        let mut built = Vec::with_capacity(questions.len());
        for (prompt, choices) in questions {
            built.push(SurveyQuestion::new(
                tables.question_sequence.next()?,
                identifier,
                prompt,
                choices,
            ));
        }
        let survey = Survey::reconstruct(identifier, name, None, built);
        tables.surveys.insert(identifier, survey.clone());
        Ok(survey)
    }
}

// =============================================================================
// UserRepository
// =============================================================================

impl UserRepository for InMemoryRecordStore {
    async fn find_user(&self, identifier: UserIdentifier) -> WorkflowResult<Option<User>> {
        Ok(self.tables.read().user(identifier))
    }

    async fn find_profile(
        &self,
        identifier: UserIdentifier,
    ) -> WorkflowResult<Option<UserProfile>> {
        let tables = self.tables.read();
        let Some(user) = tables.user(identifier) else {
            return Ok(None);
        };

        let host_events = tables
            .events
            .values()
            .filter(|event| event.host() == identifier)
            .filter_map(|event| tables.sited(event))
            .collect();

        let guest_events = tables
            .guest_events
            .iter()
            .filter(|(guest, _)| *guest == identifier)
            .filter_map(|(_, event)| {
                let event = tables.events.get(event)?;
                Some(JoinedEvent {
                    event: tables.sited(event)?,
                    host: tables.user(event.host())?,
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

// =============================================================================
// VenueRepository
// =============================================================================

impl VenueRepository for InMemoryRecordStore {
    async fn find_location(
        &self,
        identifier: LocationIdentifier,
    ) -> WorkflowResult<Option<Location>> {
        Ok(self.tables.read().locations.get(&identifier).cloned())
    }

    async fn find_building(
        &self,
        identifier: BuildingIdentifier,
    ) -> WorkflowResult<Option<BuildingDetails>> {
        let tables = self.tables.read();
        Ok(tables.buildings.get(&identifier).map(|building| BuildingDetails {
            building: building.clone(),
            locations: tables
                .locations
                .values()
                .filter(|location| location.building == identifier)
                .cloned()
                .collect(),
        }))
    }

    async fn list_buildings(&self) -> WorkflowResult<Vec<Building>> {
        Ok(self.tables.read().buildings.values().cloned().collect())
    }
}

// =============================================================================
// EventRepository
// =============================================================================

impl EventRepository for InMemoryRecordStore {
    async fn find_event(&self, identifier: EventIdentifier) -> WorkflowResult<Option<Event>> {
        Ok(self.tables.read().events.get(&identifier).cloned())
    }

    async fn find_event_details(
        &self,
        identifier: EventIdentifier,
    ) -> WorkflowResult<Option<EventDetails>> {
        let tables = self.tables.read();
        Ok(tables.events.get(&identifier).and_then(|event| {
            let sited = tables.sited(event)?;
            Some(EventDetails {
                host: tables.user(event.host())?,
                event: sited.event,
                location: sited.location,
                building: sited.building,
            })
        }))
    }

    async fn find_open_events(&self) -> WorkflowResult<Vec<ActiveEvent>> {
        let tables = self.tables.read();
        Ok(tables
            .events
            .values()
            .filter(|event| event.status().is_open())
            .filter_map(|event| {
                let sited = tables.sited(event)?;
                let requests = tables
                    .requests
                    .values()
                    .filter(|request| request.event() == event.identifier())
                    .filter_map(|request| {
                        Some(RequestWithGuest {
                            request: *request,
                            guest: tables.user(request.guest())?,
                        })
                    })
                    .collect();
                Some(ActiveEvent {
                    host: tables.user(event.host())?,
                    event: sited.event,
                    location: sited.location,
                    building: sited.building,
                    requests,
                })
            })
            .collect())
    }

    async fn insert_event(&self, event: NewEvent) -> WorkflowResult<Event> {
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&event.host) {
            return Err(WorkflowError::not_found(UserIdentifier::ENTITY_TYPE, event.host));
        }
        if !tables.locations.contains_key(&event.location) {
            return Err(WorkflowError::not_found(
                LocationIdentifier::ENTITY_TYPE,
                event.location,
            ));
        }
        let event = event.into_event(tables.event_sequence.next()?);
        tables.events.insert(event.identifier(), event.clone());
        Ok(event)
    }

    async fn transition_status(
        &self,
        identifier: EventIdentifier,
        from: EventStatus,
        to: EventStatus,
    ) -> WorkflowResult<bool> {
        let mut tables = self.tables.write();
        let expected = tables
            .events
            .get(&identifier)
            .is_some_and(|event| event.status() == from);
        if !expected {
            return Ok(false);
        }
        tables.replace_status(identifier, to)?;
        Ok(true)
    }

    async fn close_events(&self, identifiers: &[EventIdentifier]) -> WorkflowResult<u64> {
        let mut tables = self.tables.write();
        let mut rows_updated = 0;
        for identifier in identifiers {
            let still_open = tables
                .events
                .get(identifier)
                .is_some_and(|event| event.status().is_open());
            if still_open {
                tables.replace_status(*identifier, EventStatus::Closed)?;
                rows_updated += 1;
            }
        }
        Ok(rows_updated)
    }
}

// =============================================================================
// RequestRepository
// =============================================================================

impl RequestRepository for InMemoryRecordStore {
    async fn find_request(&self, identifier: RequestIdentifier) -> WorkflowResult<Option<Request>> {
        Ok(self.tables.read().requests.get(&identifier).copied())
    }

    async fn find_request_context(
        &self,
        identifier: RequestIdentifier,
    ) -> WorkflowResult<Option<RequestContext>> {
        let tables = self.tables.read();
        Ok(tables.requests.get(&identifier).and_then(|request| {
            Some(RequestContext {
                request: *request,
                event: tables.events.get(&request.event())?.clone(),
                guest: tables.user(request.guest())?,
            })
        }))
    }

    async fn insert_request(&self, request: NewRequest) -> WorkflowResult<Request> {
        let mut tables = self.tables.write();
        let request = request.into_request(tables.request_sequence.next()?);
        tables.requests.insert(request.identifier(), request);
        Ok(request)
    }

    async fn save_request(&self, request: &Request) -> WorkflowResult<()> {
        let mut tables = self.tables.write();
        let Some(stored) = tables.requests.get(&request.identifier()) else {
            return Err(WorkflowError::not_found(
                RequestIdentifier::ENTITY_TYPE,
                request.identifier(),
            ));
        };
        if !stored.status().is_pending() && stored.status() != request.status() {
            return Err(WorkflowError::conflict(format!(
                "request {} is already {}",
                request.identifier(),
                stored.status()
            )));
        }
        tables.requests.insert(request.identifier(), *request);
        Ok(())
    }

    async fn accept_request(&self, request: &Request) -> WorkflowResult<AcceptanceOutcome> {
        let mut tables = self.tables.write();

        let Some(mut stored) = tables.requests.get(&request.identifier()).copied() else {
            return Err(WorkflowError::not_found(
                RequestIdentifier::ENTITY_TYPE,
                request.identifier(),
            ));
        };
        if !stored.status().is_pending() {
            return Ok(AcceptanceOutcome::NoLongerPending);
        }
        let Some(mut event) = tables.events.get(&stored.event()).cloned() else {
            return Err(WorkflowError::not_found(
                EventIdentifier::ENTITY_TYPE,
                stored.event(),
            ));
        };

        if event.admit_guest().is_ok() {
            stored.accept()?;
            tables.events.insert(event.identifier(), event);
            tables.requests.insert(stored.identifier(), stored);
            tables.guest_events.insert((stored.guest(), stored.event()));
            Ok(AcceptanceOutcome::Accepted)
        } else {
            stored.reject()?;
            tables.requests.insert(stored.identifier(), stored);
            Ok(AcceptanceOutcome::CapacityReached)
        }
    }

    async fn find_host_requests(&self, host: UserIdentifier) -> WorkflowResult<Vec<HostRequest>> {
        let tables = self.tables.read();
        Ok(tables
            .requests
            .values()
            .filter(|request| request.host() == host && request.status().is_pending())
            .filter_map(|request| {
                Some(HostRequest {
                    request: *request,
                    event: tables.sited(tables.events.get(&request.event())?)?,
                    guest: tables.user(request.guest())?,
                })
            })
            .collect())
    }

    async fn find_guest_requests(
        &self,
        guest: UserIdentifier,
    ) -> WorkflowResult<Vec<GuestRequest>> {
        let tables = self.tables.read();
        Ok(tables
            .requests
            .values()
            .filter(|request| request.guest() == guest)
            .filter_map(|request| {
                Some(GuestRequest {
                    request: *request,
                    event: tables.sited(tables.events.get(&request.event())?)?,
                    host: tables.user(request.host())?,
                })
            })
            .collect())
    }

    async fn find_event_requests(
        &self,
        event: EventIdentifier,
    ) -> WorkflowResult<Vec<EventRequest>> {
        let tables = self.tables.read();
        Ok(tables
            .requests
            .values()
            .filter(|request| request.event() == event)
            .filter_map(|request| {
                Some(EventRequest {
                    request: *request,
                    host: tables.user(request.host())?,
                    guest: tables.user(request.guest())?,
                })
            })
            .collect())
    }
}

// =============================================================================
// SurveyRepository
// =============================================================================

impl SurveyRepository for InMemoryRecordStore {
    async fn find_survey(&self, identifier: SurveyIdentifier) -> WorkflowResult<Option<Survey>> {
        Ok(self.tables.read().surveys.get(&identifier).cloned())
    }

    async fn list_surveys(&self) -> WorkflowResult<Vec<Survey>> {
        Ok(self.tables.read().surveys.values().cloned().collect())
    }

    async fn find_survey_by_question(
        &self,
        question: SurveyQuestionIdentifier,
    ) -> WorkflowResult<Option<Survey>> {
        let tables = self.tables.read();
        Ok(tables
            .survey_owning(question)
            .and_then(|survey| tables.surveys.get(&survey).cloned()))
    }

    async fn insert_answer(&self, answer: NewSurveyAnswer) -> WorkflowResult<SurveyAnswer> {
        let mut tables = self.tables.write();
        let survey = tables.survey_owning(answer.question).ok_or_else(|| {
            WorkflowError::not_found(SurveyQuestionIdentifier::ENTITY_TYPE, answer.question)
        })?;
        let identifier: SurveyAnswerIdentifier = tables.answer_sequence.next()?;
        let answer = answer.into_answer(identifier);
        if let Some(stored) = tables.surveys.get_mut(&survey) {
            stored.record_answer(answer.clone())?;
        }
        Ok(answer)
    }

    async fn save_progress(&self, survey: &Survey) -> WorkflowResult<()> {
        let mut tables = self.tables.write();
        let stored = tables.surveys.get(&survey.identifier()).ok_or_else(|| {
            WorkflowError::not_found(SurveyIdentifier::ENTITY_TYPE, survey.identifier())
        })?;
        let updated = Survey::reconstruct(
            stored.identifier(),
            stored.name(),
            survey.current_question_index(),
            stored.questions().to_vec(),
        );
        tables.surveys.insert(updated.identifier(), updated);
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
