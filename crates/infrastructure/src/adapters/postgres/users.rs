use rendezvous_domain::common::UserIdentifier;
use rendezvous_domain::user::User;
use rendezvous_workflow::ports::{UserRepository, WorkflowResult};
use rendezvous_workflow::views::{JoinedEvent, UserProfile};

use super::rows::{
    SITED_EVENT_COLUMNS, SITED_EVENT_JOINS, decode_sited_event, decode_user, user_columns,
};
use super::store::{PostgresRecordStore, failure};

impl UserRepository for PostgresRecordStore {
    async fn find_user(&self, identifier: UserIdentifier) -> WorkflowResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users u WHERE u.id = $1",
            user_columns("u", "user")
        ))
        .bind(identifier.value())
        .fetch_optional(self.pool().as_inner())
        .await
        .map_err(failure("find_user"))?;

        row.map(|row| decode_user(&row, "user"))
            .transpose()
            .map_err(failure("find_user"))
    }

    async fn find_profile(
        &self,
        identifier: UserIdentifier,
    ) -> WorkflowResult<Option<UserProfile>> {
        let Some(user) = self.find_user(identifier).await? else {
            return Ok(None);
        };
        let pool = self.pool().as_inner();

        let hosted = sqlx::query(&format!(
            "SELECT {SITED_EVENT_COLUMNS} {SITED_EVENT_JOINS} WHERE e.host_id = $1 ORDER BY e.id"
        ))
        .bind(identifier.value())
        .fetch_all(pool)
        .await
        .map_err(failure("find_profile"))?;

        let joined = sqlx::query(&format!(
            "SELECT {SITED_EVENT_COLUMNS}, {host} {SITED_EVENT_JOINS} \
             JOIN guest_events g ON g.event_id = e.id \
             JOIN users h ON h.id = e.host_id \
             WHERE g.user_id = $1 ORDER BY e.id",
            host = user_columns("h", "host")
        ))
        .bind(identifier.value())
        .fetch_all(pool)
        .await
        .map_err(failure("find_profile"))?;

        let host_events = hosted
            .iter()
            .map(decode_sited_event)
            .collect::<Result<Vec<_>, _>>()
            .map_err(failure("find_profile"))?;
        let guest_events = joined
            .iter()
            .map(|row| {
                Ok(JoinedEvent {
                    event: decode_sited_event(row)?,
                    host: decode_user(row, "host")?,
                })
            })
            .collect::<Result<Vec<_>, crate::errors::InfraError>>()
            .map_err(failure("find_profile"))?;

        Ok(Some(UserProfile {
            user,
            host_events,
            guest_events,
        }))
    }
}
