// src/db/venue_repository.rs
// DOCUMENTATION: Database access layer - all SQL queries for venues
// PURPOSE: SQLite-backed VenueStore

use crate::db::VenueStore;
use crate::errors::VenueError;
use crate::models::Venue;
use crate::services::Region;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

const SELECT_VENUES: &str =
    "SELECT id, name, latitude, longitude, address, updated_at FROM venues";

const UPSERT_VENUE: &str = r#"
    INSERT INTO venues (id, name, latitude, longitude, address, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    ON CONFLICT (id) DO UPDATE SET
        name = excluded.name,
        latitude = excluded.latitude,
        longitude = excluded.longitude,
        address = excluded.address,
        updated_at = excluded.updated_at
"#;

/// Internal struct for mapping database rows to Venue
#[derive(Debug, FromRow)]
struct VenueRow {
    id: String,
    name: String,
    latitude: f64,
    longitude: f64,
    address: String,
    #[allow(dead_code)]
    updated_at: i64,
}

impl VenueRow {
    fn to_venue(self) -> Venue {
        Venue {
            id: self.id,
            name: self.name,
            latitude: self.latitude,
            longitude: self.longitude,
            address: self.address,
        }
    }
}

/// VenueRepository: SQLite implementation of VenueStore
/// DOCUMENTATION: Cheap to clone; clones share the connection pool
#[derive(Clone)]
pub struct VenueRepository {
    pool: SqlitePool,
}

impl VenueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn storage_error(context: &str, e: sqlx::Error) -> VenueError {
    log::error!("{}: {}", context, e);
    VenueError::Storage(e.to_string())
}

#[async_trait]
impl VenueStore for VenueRepository {
    async fn upsert(&self, venue: &Venue) -> Result<(), VenueError> {
        sqlx::query(UPSERT_VENUE)
            .bind(&venue.id)
            .bind(&venue.name)
            .bind(venue.latitude)
            .bind(venue.longitude)
            .bind(&venue.address)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error(&format!("Failed to upsert venue {}", venue.id), e))?;

        Ok(())
    }

    /// Upsert a batch of venues
    /// DOCUMENTATION: One transaction per batch. Any failing statement
    /// returns early, dropping the transaction, which rolls it back.
    async fn upsert_batch(&self, venues: &[Venue]) -> Result<usize, VenueError> {
        let now = Utc::now().timestamp_millis();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| storage_error("Failed to begin venue batch", e))?;

        for venue in venues {
            sqlx::query(UPSERT_VENUE)
                .bind(&venue.id)
                .bind(&venue.name)
                .bind(venue.latitude)
                .bind(venue.longitude)
                .bind(&venue.address)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    storage_error(&format!("Failed to upsert venue {} in batch", venue.id), e)
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| storage_error("Failed to commit venue batch", e))?;

        log::debug!("Committed batch of {} venues", venues.len());
        Ok(venues.len())
    }

    async fn query_in_region(&self, region: &Region) -> Result<Vec<Venue>, VenueError> {
        let sql = if region.crosses_antimeridian() {
            format!(
                "{} WHERE latitude BETWEEN ?1 AND ?2 AND (longitude >= ?3 OR longitude <= ?4)",
                SELECT_VENUES
            )
        } else {
            format!(
                "{} WHERE latitude BETWEEN ?1 AND ?2 AND longitude BETWEEN ?3 AND ?4",
                SELECT_VENUES
            )
        };

        let rows = sqlx::query_as::<_, VenueRow>(&sql)
            .bind(region.min_lat)
            .bind(region.max_lat)
            .bind(region.min_lon)
            .bind(region.max_lon)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| storage_error("Region query failed", e))?;

        log::debug!("Region query {:?} matched {} venues", region, rows.len());
        Ok(rows.into_iter().map(VenueRow::to_venue).collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Venue>, VenueError> {
        let row = sqlx::query_as::<_, VenueRow>(&format!("{} WHERE id = ?1", SELECT_VENUES))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error(&format!("Failed to get venue {}", id), e))?;

        Ok(row.map(VenueRow::to_venue))
    }

    async fn count(&self) -> Result<i64, VenueError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM venues")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Count query failed", e))?;

        Ok(count)
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, VenueError> {
        let removed = sqlx::query("DELETE FROM venues WHERE updated_at < ?1")
            .bind(cutoff.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Prune failed", e))?
            .rows_affected();

        if removed > 0 {
            log::info!("Pruned {} venues not refreshed since {}", removed, cutoff.to_rfc3339());
        }

        Ok(removed)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::{init_db_pool, init_memory_pool, Config};
    use crate::models::GeoPoint;
    use crate::services::{bounding_box, offset};
    use chrono::Duration;
    use tokio_test::assert_ok;

    pub(crate) async fn memory_repository() -> VenueRepository {
        VenueRepository::new(init_memory_pool().await.unwrap())
    }

    /// Make every insert of `id` abort, simulating a storage failure mid-batch
    pub(crate) async fn poison_id(repo: &VenueRepository, id: &str) {
        let trigger = format!(
            "CREATE TRIGGER poison_{id} BEFORE INSERT ON venues WHEN NEW.id = '{id}' \
             BEGIN SELECT RAISE(ABORT, 'simulated storage failure'); END"
        );
        sqlx::query(&trigger).execute(repo.pool()).await.unwrap();
    }

    pub(crate) fn venue(id: &str, name: &str, at: GeoPoint) -> Venue {
        Venue {
            id: id.to_string(),
            name: name.to_string(),
            latitude: at.latitude,
            longitude: at.longitude,
            address: format!("{} street", name),
        }
    }

    const CENTER: GeoPoint = GeoPoint::new(52.0, 4.9);

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let repo = memory_repository().await;
        let v = venue("1", "Cafe A", CENTER);

        assert_ok!(repo.upsert(&v).await);
        let once = repo.get("1").await.unwrap();
        assert_ok!(repo.upsert(&v).await);
        let twice = repo.get("1").await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_all_fields() {
        let repo = memory_repository().await;
        repo.upsert(&venue("1", "Cafe A", CENTER)).await.unwrap();

        let moved = Venue {
            id: "1".into(),
            name: "Cafe A2".into(),
            latitude: 10.0,
            longitude: 20.0,
            address: String::new(),
        };
        repo.upsert(&moved).await.unwrap();

        assert_eq!(repo.get("1").await.unwrap(), Some(moved));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_batch_keeps_one_record_per_id() {
        let repo = memory_repository().await;
        let batch = vec![
            venue("1", "first", CENTER),
            venue("2", "other", CENTER),
            venue("1", "last", CENTER),
        ];

        assert_eq!(repo.upsert_batch(&batch).await.unwrap(), 3);
        assert_eq!(repo.count().await.unwrap(), 2);
        assert_eq!(repo.get("1").await.unwrap().unwrap().name, "last");
    }

    #[tokio::test]
    async fn test_failed_batch_is_rolled_back() {
        let repo = memory_repository().await;
        repo.upsert(&venue("1", "before", CENTER)).await.unwrap();
        poison_id(&repo, "bad").await;

        let batch = vec![
            venue("1", "after", CENTER),
            venue("2", "new", CENTER),
            venue("bad", "boom", CENTER),
            venue("3", "never", CENTER),
        ];
        let result = repo.upsert_batch(&batch).await;

        assert!(matches!(result, Err(VenueError::Storage(_))));
        assert_eq!(repo.get("1").await.unwrap().unwrap().name, "before");
        assert!(repo.get("2").await.unwrap().is_none());
        assert!(repo.get("3").await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 1);

        // Store stays usable after a failed batch
        assert_ok!(repo.upsert_batch(&[venue("2", "new", CENTER)]).await);
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_query_in_region_filters_by_box() {
        let repo = memory_repository().await;
        let batch = vec![
            venue("in", "in", offset(CENTER, 100.0, 100.0)),
            venue("edge_out", "edge_out", offset(CENTER, 0.0, 260.0)),
            venue("far", "far", offset(CENTER, 2000.0, 0.0)),
        ];
        repo.upsert_batch(&batch).await.unwrap();

        let region = bounding_box(CENTER, 500.0, 500.0);
        let found = repo.query_in_region(&region).await.unwrap();

        let ids: Vec<_> = found.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["in"]);
    }

    #[tokio::test]
    async fn test_query_across_antimeridian() {
        let repo = memory_repository().await;
        let center = GeoPoint::new(0.0, 179.999);
        repo.upsert_batch(&[
            venue("east", "east", GeoPoint::new(0.0, 179.9995)),
            venue("west", "west", GeoPoint::new(0.0, -179.9995)),
            venue("origin", "origin", GeoPoint::new(0.0, 0.0)),
        ])
        .await
        .unwrap();

        let mut ids: Vec<_> = repo
            .query_in_region(&bounding_box(center, 1000.0, 1000.0))
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.id)
            .collect();
        ids.sort();

        assert_eq!(ids, vec!["east", "west"]);
    }

    #[tokio::test]
    async fn test_prune_older_than() {
        let repo = memory_repository().await;
        repo.upsert(&venue("1", "Cafe A", CENTER)).await.unwrap();

        let removed = repo
            .prune_older_than(Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(removed, 0);

        let removed = repo
            .prune_older_than(Utc::now() + Duration::seconds(1))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_venues_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("venues.db").display());

        let mut config = Config::for_tests();
        config.database_url = url;

        let repo = VenueRepository::new(init_db_pool(&config).await.unwrap());
        repo.upsert(&venue("1", "Cafe A", CENTER)).await.unwrap();
        repo.pool().close().await;

        let reopened = VenueRepository::new(init_db_pool(&config).await.unwrap());
        assert_eq!(reopened.get("1").await.unwrap().unwrap().name, "Cafe A");
    }
}
