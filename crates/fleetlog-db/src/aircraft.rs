//! Aircraft utilization repository implementation.
//!
//! The store path is idempotent over the natural key (registration, msn,
//! month): the check and the write run inside one transaction, and the
//! unique index on the key turns a lost race into the duplicate outcome
//! instead of a second parent row.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use fleetlog_core::{
    AircraftRecord, AircraftRepository, AircraftUtilization, ComponentData, ComponentSlot, Error,
    Result, StoreOutcome, StoredComponent,
};

/// PostgreSQL implementation of AircraftRepository.
pub struct PgAircraftRepository {
    pool: Pool<Postgres>,
}

impl PgAircraftRepository {
    /// Create a new PgAircraftRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Natural-key lookup inside a transaction. NULL-safe comparison so a
    /// report missing (say) its MSN still matches an earlier report that
    /// also lacked one.
    async fn find_id_by_key_tx(
        tx: &mut Transaction<'_, Postgres>,
        registration: Option<&str>,
        msn: Option<&str>,
        month: Option<&str>,
    ) -> Result<Option<Uuid>> {
        let row = sqlx::query(
            r#"
            SELECT id FROM aircraft_utilization
            WHERE registration IS NOT DISTINCT FROM $1
              AND msn IS NOT DISTINCT FROM $2
              AND month IS NOT DISTINCT FROM $3
            ORDER BY created_at_utc DESC
            LIMIT 1
            "#,
        )
        .bind(registration)
        .bind(msn)
        .bind(month)
        .fetch_optional(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| r.get("id")))
    }

    async fn insert_component_tx(
        tx: &mut Transaction<'_, Postgres>,
        aircraft_id: Uuid,
        slot: ComponentSlot,
        data: &ComponentData,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO aircraft_component
                (id, aircraft_id, component_type, tsn, csn,
                 monthly_util_hrs, monthly_util_cyc, serial_number, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(aircraft_id)
        .bind(slot.as_str())
        .bind(data.tsn)
        .bind(data.csn)
        .bind(data.monthly_util_hrs)
        .bind(data.monthly_util_cyc)
        .bind(data.serial_number.as_deref())
        .bind(data.location.as_deref())
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        Ok(())
    }

    /// Load all child components for a set of parent rows already mapped.
    async fn load_components(&self, aircraft_id: Uuid) -> Result<Vec<StoredComponent>> {
        let rows = sqlx::query(
            r#"
            SELECT id, component_type, tsn, csn,
                   monthly_util_hrs, monthly_util_cyc, serial_number, location
            FROM aircraft_component
            WHERE aircraft_id = $1
            "#,
        )
        .bind(aircraft_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut components = Vec::with_capacity(rows.len());
        for row in rows {
            let type_str: String = row.get("component_type");
            let Some(slot) = ComponentSlot::parse(&type_str) else {
                warn!(
                    subsystem = "db",
                    component = "aircraft",
                    record_id = %aircraft_id,
                    slot = %type_str,
                    "Skipping component row with unknown slot discriminator"
                );
                continue;
            };
            components.push(StoredComponent {
                id: row.get("id"),
                slot,
                data: ComponentData {
                    tsn: row.get("tsn"),
                    csn: row.get("csn"),
                    monthly_util_hrs: row.get("monthly_util_hrs"),
                    monthly_util_cyc: row.get("monthly_util_cyc"),
                    serial_number: row.get("serial_number"),
                    location: row.get("location"),
                },
            });
        }

        // Canonical slot order regardless of insertion order.
        components.sort_by_key(|c| ComponentSlot::ALL.iter().position(|s| *s == c.slot));
        Ok(components)
    }

    async fn record_from_row(&self, row: sqlx::postgres::PgRow) -> Result<AircraftRecord> {
        let id: Uuid = row.get("id");
        let components = self.load_components(id).await?;
        Ok(AircraftRecord {
            id,
            airline: row.get("airline"),
            month: row.get("month"),
            msn: row.get("msn"),
            registration: row.get("registration"),
            aircraft_type: row.get("aircraft_type"),
            days_flown: row.get("days_flown"),
            created_at_utc: row.get("created_at_utc"),
            components,
        })
    }
}

#[async_trait]
impl AircraftRepository for PgAircraftRepository {
    async fn store(&self, record: &AircraftUtilization) -> Result<StoreOutcome> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if let Some(existing_id) = Self::find_id_by_key_tx(
            &mut tx,
            record.registration.as_deref(),
            record.msn.as_deref(),
            record.month.as_deref(),
        )
        .await?
        {
            tx.commit().await.map_err(Error::Database)?;
            info!(
                subsystem = "db",
                component = "aircraft",
                op = "store",
                record_id = %existing_id,
                registration = record.registration.as_deref().unwrap_or(""),
                month = record.month.as_deref().unwrap_or(""),
                "Record already exists for natural key, returning existing identity"
            );
            return Ok(StoreOutcome {
                id: existing_id,
                is_new: false,
            });
        }

        let id = Uuid::new_v4();
        let inserted = sqlx::query(
            r#"
            INSERT INTO aircraft_utilization
                (id, airline, month, msn, registration, aircraft_type, days_flown)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (registration, msn, month) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(record.airline.as_deref())
        .bind(record.month.as_deref())
        .bind(record.msn.as_deref())
        .bind(record.registration.as_deref())
        .bind(record.aircraft_type.as_deref())
        .bind(record.days_flown)
        .fetch_optional(&mut *tx)
        .await
        .map_err(Error::Database)?;

        if inserted.is_none() {
            // A concurrent store won the race between our check and our
            // insert. Report the surviving record as a duplicate.
            tx.rollback().await.map_err(Error::Database)?;
            let mut lookup_tx = self.pool.begin().await.map_err(Error::Database)?;
            let winner = Self::find_id_by_key_tx(
                &mut lookup_tx,
                record.registration.as_deref(),
                record.msn.as_deref(),
                record.month.as_deref(),
            )
            .await?
            .ok_or_else(|| {
                Error::Internal("Conflicting aircraft record vanished during store".to_string())
            })?;
            lookup_tx.commit().await.map_err(Error::Database)?;
            return Ok(StoreOutcome {
                id: winner,
                is_new: false,
            });
        }

        let mut child_count = 0usize;
        for (slot, data) in record.components.non_empty_slots() {
            Self::insert_component_tx(&mut tx, id, slot, data).await?;
            child_count += 1;
        }

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "db",
            component = "aircraft",
            op = "store",
            record_id = %id,
            registration = record.registration.as_deref().unwrap_or(""),
            month = record.month.as_deref().unwrap_or(""),
            components = child_count,
            "Created new aircraft record"
        );

        Ok(StoreOutcome { id, is_new: true })
    }

    async fn fetch(&self, id: Uuid) -> Result<AircraftRecord> {
        let row = sqlx::query(
            r#"
            SELECT id, airline, month, msn, registration, aircraft_type,
                   days_flown, created_at_utc
            FROM aircraft_utilization
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?
        .ok_or(Error::RecordNotFound(id))?;

        self.record_from_row(row).await
    }

    async fn find_by_natural_key(
        &self,
        registration: &str,
        msn: &str,
        month: &str,
    ) -> Result<Option<AircraftRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, airline, month, msn, registration, aircraft_type,
                   days_flown, created_at_utc
            FROM aircraft_utilization
            WHERE registration = $1 AND msn = $2 AND month = $3
            ORDER BY created_at_utc DESC
            LIMIT 1
            "#,
        )
        .bind(registration)
        .bind(msn)
        .bind(month)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        match row {
            Some(row) => Ok(Some(self.record_from_row(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_registration(
        &self,
        registration: &str,
        month: Option<&str>,
    ) -> Result<Option<AircraftRecord>> {
        debug!(
            subsystem = "db",
            component = "aircraft",
            op = "find_by_registration",
            registration,
            month = month.unwrap_or(""),
            "Looking up latest record for registration"
        );

        let row = match month {
            Some(month) => {
                sqlx::query(
                    r#"
                    SELECT id, airline, month, msn, registration, aircraft_type,
                           days_flown, created_at_utc
                    FROM aircraft_utilization
                    WHERE registration = $1 AND month = $2
                    ORDER BY created_at_utc DESC
                    LIMIT 1
                    "#,
                )
                .bind(registration)
                .bind(month)
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, airline, month, msn, registration, aircraft_type,
                           days_flown, created_at_utc
                    FROM aircraft_utilization
                    WHERE registration = $1
                    ORDER BY created_at_utc DESC
                    LIMIT 1
                    "#,
                )
                .bind(registration)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(Error::Database)?;

        match row {
            Some(row) => Ok(Some(self.record_from_row(row).await?)),
            None => Ok(None),
        }
    }
}
