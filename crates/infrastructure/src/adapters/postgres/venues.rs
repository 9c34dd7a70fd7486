use rendezvous_domain::common::{BuildingIdentifier, LocationIdentifier};
use rendezvous_domain::venue::{Building, Location};
use rendezvous_workflow::ports::{VenueRepository, WorkflowResult};
use rendezvous_workflow::views::BuildingDetails;

use super::rows::{decode_building, decode_location};
use super::store::{PostgresRecordStore, failure};

const LOCATION_COLUMNS: &str = "l.id AS location_id, l.name AS location_name, l.building_id";

const BUILDING_COLUMNS: &str = "b.id AS building_id, b.name AS building_name";

impl VenueRepository for PostgresRecordStore {
    async fn find_location(
        &self,
        identifier: LocationIdentifier,
    ) -> WorkflowResult<Option<Location>> {
        let row = sqlx::query(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations l WHERE l.id = $1"
        ))
        .bind(identifier.value())
        .fetch_optional(self.pool().as_inner())
        .await
        .map_err(failure("find_location"))?;

        row.map(|row| decode_location(&row))
            .transpose()
            .map_err(failure("find_location"))
    }

    async fn find_building(
        &self,
        identifier: BuildingIdentifier,
    ) -> WorkflowResult<Option<BuildingDetails>> {
        let pool = self.pool().as_inner();

        let Some(row) = sqlx::query(&format!(
            "SELECT {BUILDING_COLUMNS} FROM buildings b WHERE b.id = $1"
        ))
        .bind(identifier.value())
        .fetch_optional(pool)
        .await
        .map_err(failure("find_building"))?
        else {
            return Ok(None);
        };
        let building = decode_building(&row).map_err(failure("find_building"))?;

        let locations = sqlx::query(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations l WHERE l.building_id = $1 ORDER BY l.id"
        ))
        .bind(identifier.value())
        .fetch_all(pool)
        .await
        .map_err(failure("find_building"))?
        .iter()
        .map(decode_location)
        .collect::<Result<Vec<_>, _>>()
        .map_err(failure("find_building"))?;

        Ok(Some(BuildingDetails {
            building,
            locations,
        }))
    }

    async fn list_buildings(&self) -> WorkflowResult<Vec<Building>> {
        sqlx::query(&format!("SELECT {BUILDING_COLUMNS} FROM buildings b ORDER BY b.id"))
            .fetch_all(self.pool().as_inner())
            .await
            .map_err(failure("list_buildings"))?
            .iter()
            .map(decode_building)
            .collect::<Result<Vec<_>, _>>()
            .map_err(failure("list_buildings"))
    }
}
