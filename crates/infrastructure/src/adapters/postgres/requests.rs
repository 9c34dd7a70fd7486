use rendezvous_domain::common::{EventIdentifier, RequestIdentifier, UserIdentifier};
use rendezvous_domain::request::{NewRequest, Request, RequestStatus};
use rendezvous_workflow::errors::WorkflowError;
use rendezvous_workflow::ports::{AcceptanceOutcome, RequestRepository, WorkflowResult};
use rendezvous_workflow::views::{EventRequest, GuestRequest, HostRequest, RequestContext};
use sqlx::Row;

use super::rows::{
    EVENT_COLUMNS, REQUEST_COLUMNS, SITED_EVENT_COLUMNS, SITED_EVENT_JOINS, decode_event,
    decode_request, decode_sited_event, decode_user, user_columns,
};
use super::store::{PostgresRecordStore, failure};
use crate::errors::InfraError;

impl RequestRepository for PostgresRecordStore {
    async fn find_request(&self, identifier: RequestIdentifier) -> WorkflowResult<Option<Request>> {
        let row = sqlx::query(&format!("SELECT {REQUEST_COLUMNS} FROM requests r WHERE r.id = $1"))
            .bind(identifier.value())
            .fetch_optional(self.pool().as_inner())
            .await
            .map_err(failure("find_request"))?;

        row.map(|row| decode_request(&row))
            .transpose()
            .map_err(failure("find_request"))
    }

    async fn find_request_context(
        &self,
        identifier: RequestIdentifier,
    ) -> WorkflowResult<Option<RequestContext>> {
        let row = sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS}, {EVENT_COLUMNS}, {guest} FROM requests r \
             JOIN events e ON e.id = r.event_id \
             JOIN users g ON g.id = r.guest_id \
             WHERE r.id = $1",
            guest = user_columns("g", "guest")
        ))
        .bind(identifier.value())
        .fetch_optional(self.pool().as_inner())
        .await
        .map_err(failure("find_request_context"))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let decode = || -> Result<RequestContext, InfraError> {
            Ok(RequestContext {
                request: decode_request(&row)?,
                event: decode_event(&row)?,
                guest: decode_user(&row, "guest")?,
            })
        };
        decode().map(Some).map_err(failure("find_request_context"))
    }

    async fn insert_request(&self, request: NewRequest) -> WorkflowResult<Request> {
        let identifier: i64 = sqlx::query_scalar(
            "INSERT INTO requests (guest_id, host_id, event_id, request_status) \
             VALUES ($1, $2, $3, 'pending') RETURNING id",
        )
        .bind(request.guest.value())
        .bind(request.host.value())
        .bind(request.event.value())
        .fetch_one(self.pool().as_inner())
        .await
        .map_err(failure("insert_request"))?;

        let identifier = RequestIdentifier::new(identifier).map_err(failure("insert_request"))?;
        Ok(request.into_request(identifier))
    }

    async fn save_request(&self, request: &Request) -> WorkflowResult<()> {
        let pool = self.pool().as_inner();
        let result = sqlx::query(
            "UPDATE requests SET request_status = $2 \
             WHERE id = $1 AND request_status IN ('pending', $2)",
        )
        .bind(request.identifier().value())
        .bind(request.status().as_str())
        .execute(pool)
        .await
        .map_err(failure("save_request"))?;
        if result.rows_affected() == 1 {
            return Ok(());
        }

        let stored: Option<String> =
            sqlx::query_scalar("SELECT request_status FROM requests WHERE id = $1")
                .bind(request.identifier().value())
                .fetch_optional(pool)
                .await
                .map_err(failure("save_request"))?;
        match stored {
            None => Err(WorkflowError::not_found(
                RequestIdentifier::ENTITY_TYPE,
                request.identifier(),
            )),
            Some(status) => Err(WorkflowError::conflict(format!(
                "request {} is already {status}",
                request.identifier()
            ))),
        }
    }

    async fn accept_request(&self, request: &Request) -> WorkflowResult<AcceptanceOutcome> {
        let mut transaction = self
            .pool()
            .as_inner()
            .begin()
            .await
            .map_err(failure("accept_request"))?;

        // Step 1: lock the request row and re-read its status [IO]
        let Some(row) = sqlx::query(
            "SELECT event_id, guest_id, request_status FROM requests WHERE id = $1 FOR UPDATE",
        )
        .bind(request.identifier().value())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(failure("accept_request"))?
        else {
            return Err(WorkflowError::not_found(
                RequestIdentifier::ENTITY_TYPE,
                request.identifier(),
            ));
        };
        let event: i64 = row.try_get("event_id").map_err(failure("accept_request"))?;
        let guest: i64 = row.try_get("guest_id").map_err(failure("accept_request"))?;
        let status: String = row
            .try_get("request_status")
            .map_err(failure("accept_request"))?;
        if RequestStatus::parse(&status) != Some(RequestStatus::Pending) {
            return Ok(AcceptanceOutcome::NoLongerPending);
        }

        // Step 2: take a seat only while one is left [IO]
        let seat = sqlx::query(
            "UPDATE events SET guest_count = guest_count + 1 \
             WHERE id = $1 AND guest_count < max_guest_count",
        )
        .bind(event)
        .execute(&mut *transaction)
        .await
        .map_err(failure("accept_request"))?;

        // Step 3: record the decision [IO]
        let outcome = if seat.rows_affected() == 1 {
            sqlx::query(
                "INSERT INTO guest_events (user_id, event_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(guest)
            .bind(event)
            .execute(&mut *transaction)
            .await
            .map_err(failure("accept_request"))?;
            AcceptanceOutcome::Accepted
        } else {
            AcceptanceOutcome::CapacityReached
        };
        let decided = match outcome {
            AcceptanceOutcome::Accepted => RequestStatus::Accepted,
            _ => RequestStatus::Rejected,
        };
        sqlx::query("UPDATE requests SET request_status = $2 WHERE id = $1")
            .bind(request.identifier().value())
            .bind(decided.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(failure("accept_request"))?;

        transaction
            .commit()
            .await
            .map_err(failure("accept_request"))?;

        tracing::debug!(
            request_id = %request.identifier(),
            event_id = event,
            ?outcome,
            "Acceptance committed"
        );
        Ok(outcome)
    }

    async fn find_host_requests(&self, host: UserIdentifier) -> WorkflowResult<Vec<HostRequest>> {
        sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS}, {SITED_EVENT_COLUMNS}, {guest} {SITED_EVENT_JOINS} \
             JOIN requests r ON r.event_id = e.id \
             JOIN users g ON g.id = r.guest_id \
             WHERE r.host_id = $1 AND r.request_status = 'pending' ORDER BY r.id",
            guest = user_columns("g", "guest")
        ))
        .bind(host.value())
        .fetch_all(self.pool().as_inner())
        .await
        .map_err(failure("find_host_requests"))?
        .iter()
        .map(|row| {
            Ok(HostRequest {
                request: decode_request(row)?,
                event: decode_sited_event(row)?,
                guest: decode_user(row, "guest")?,
            })
        })
        .collect::<Result<Vec<_>, InfraError>>()
        .map_err(failure("find_host_requests"))
    }

    async fn find_guest_requests(
        &self,
        guest: UserIdentifier,
    ) -> WorkflowResult<Vec<GuestRequest>> {
        sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS}, {SITED_EVENT_COLUMNS}, {host} {SITED_EVENT_JOINS} \
             JOIN requests r ON r.event_id = e.id \
             JOIN users h ON h.id = r.host_id \
             WHERE r.guest_id = $1 ORDER BY r.id",
            host = user_columns("h", "host")
        ))
        .bind(guest.value())
        .fetch_all(self.pool().as_inner())
        .await
        .map_err(failure("find_guest_requests"))?
        .iter()
        .map(|row| {
            Ok(GuestRequest {
                request: decode_request(row)?,
                event: decode_sited_event(row)?,
                host: decode_user(row, "host")?,
            })
        })
        .collect::<Result<Vec<_>, InfraError>>()
        .map_err(failure("find_guest_requests"))
    }

    async fn find_event_requests(
        &self,
        event: EventIdentifier,
    ) -> WorkflowResult<Vec<EventRequest>> {
        sqlx::query(&format!(
            "SELECT {REQUEST_COLUMNS}, {host}, {guest} FROM requests r \
             JOIN users h ON h.id = r.host_id \
             JOIN users g ON g.id = r.guest_id \
             WHERE r.event_id = $1 ORDER BY r.id",
            host = user_columns("h", "host"),
            guest = user_columns("g", "guest")
        ))
        .bind(event.value())
        .fetch_all(self.pool().as_inner())
        .await
        .map_err(failure("find_event_requests"))?
        .iter()
        .map(|row| {
            Ok(EventRequest {
                request: decode_request(row)?,
                host: decode_user(row, "host")?,
                guest: decode_user(row, "guest")?,
            })
        })
        .collect::<Result<Vec<_>, InfraError>>()
        .map_err(failure("find_event_requests"))
    }
}
