//! Multi-tenant operations repository implementation.
//!
//! The batch save path is deliberately best-effort per entity, unlike the
//! aircraft store: one bad component must not discard the rest of a monthly
//! dashboard upload. Parents are written before children so generated ids
//! flow down; failures are itemized into the outcome's error list.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

use fleetlog_core::{
    AssetRecord, ComponentRecord, Error, LesseeRecord, OperationsAsset, OperationsComponent,
    OperationsRepository, Result, SaveOperationsOutcome, SaveOperationsRequest,
};

/// PostgreSQL implementation of OperationsRepository.
pub struct PgOperationsRepository {
    pool: Pool<Postgres>,
}

impl PgOperationsRepository {
    /// Create a new PgOperationsRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn insert_lessee(&self, name: &str, month: &str, file_name: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO lessee (id, name, month, file_name)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(month)
        .bind(file_name)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(id)
    }

    async fn insert_asset(
        &self,
        lessee_id: Uuid,
        asset: &OperationsAsset,
        month: &str,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO asset
                (id, lessee_id, name, serial_number, registration_number,
                 validation_status, report_status, obligation_status, month)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(id)
        .bind(lessee_id)
        .bind(&asset.name)
        .bind(&asset.serial_number)
        .bind(&asset.registration_number)
        .bind(&asset.validation_status)
        .bind(&asset.report_status)
        .bind(&asset.obligation_status)
        .bind(month)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(id)
    }

    async fn insert_component(
        &self,
        asset_id: Uuid,
        component: &OperationsComponent,
        month: &str,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO operations_component
                (id, asset_id, component_type, serial_number, last_utilization_date,
                 flight_hours, flight_cycles, apu_hours, apu_cycles,
                 tsn_at_period, csn_at_period, tsn_at_period_end, csn_at_period_end,
                 last_tsn_csn_update, last_tsn_utilization, last_csn_utilization,
                 attachment_status, engine_thrust, status, util_report_status,
                 asset_status, derate, month)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)
            "#,
        )
        .bind(id)
        .bind(asset_id)
        .bind(&component.component_type)
        .bind(&component.serial_number)
        .bind(&component.last_utilization_date)
        .bind(&component.flight_hours)
        .bind(&component.flight_cycles)
        .bind(&component.apu_hours)
        .bind(&component.apu_cycles)
        .bind(&component.tsn_at_period)
        .bind(&component.csn_at_period)
        .bind(&component.tsn_at_period_end)
        .bind(&component.csn_at_period_end)
        .bind(&component.last_tsn_csn_update)
        .bind(&component.last_tsn_utilization)
        .bind(&component.last_csn_utilization)
        .bind(&component.attachment_status)
        .bind(&component.engine_thrust)
        .bind(&component.status)
        .bind(&component.util_report_status)
        .bind(&component.asset_status)
        .bind(&component.derate)
        .bind(month)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(id)
    }

    /// Assemble nested lessee records for an already-fetched set of lessee
    /// rows: one query per level, grouped in memory, instead of a query
    /// per parent.
    async fn assemble_lessees(&self, rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<LesseeRecord>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let lessee_ids: Vec<Uuid> = rows.iter().map(|r| r.get("id")).collect();

        let asset_rows = sqlx::query(
            r#"
            SELECT id, lessee_id, name, serial_number, registration_number,
                   validation_status, report_status, obligation_status,
                   month, created_at_utc
            FROM asset
            WHERE lessee_id = ANY($1)
            ORDER BY created_at_utc
            "#,
        )
        .bind(&lessee_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let asset_ids: Vec<Uuid> = asset_rows.iter().map(|r| r.get("id")).collect();

        let component_rows = if asset_ids.is_empty() {
            Vec::new()
        } else {
            sqlx::query(
                r#"
                SELECT id, asset_id, component_type, serial_number,
                       last_utilization_date, flight_hours, flight_cycles,
                       apu_hours, apu_cycles, tsn_at_period, csn_at_period,
                       tsn_at_period_end, csn_at_period_end, last_tsn_csn_update,
                       last_tsn_utilization, last_csn_utilization,
                       attachment_status, engine_thrust, status,
                       util_report_status, asset_status, derate, month,
                       created_at_utc
                FROM operations_component
                WHERE asset_id = ANY($1)
                ORDER BY created_at_utc
                "#,
            )
            .bind(&asset_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?
        };

        let mut components_by_asset: HashMap<Uuid, Vec<ComponentRecord>> = HashMap::new();
        for row in component_rows {
            let asset_id: Uuid = row.get("asset_id");
            components_by_asset
                .entry(asset_id)
                .or_default()
                .push(ComponentRecord {
                    id: row.get("id"),
                    data: OperationsComponent {
                        component_type: row.get("component_type"),
                        serial_number: row.get("serial_number"),
                        last_utilization_date: row.get("last_utilization_date"),
                        flight_hours: row.get("flight_hours"),
                        flight_cycles: row.get("flight_cycles"),
                        apu_hours: row.get("apu_hours"),
                        apu_cycles: row.get("apu_cycles"),
                        tsn_at_period: row.get("tsn_at_period"),
                        csn_at_period: row.get("csn_at_period"),
                        tsn_at_period_end: row.get("tsn_at_period_end"),
                        csn_at_period_end: row.get("csn_at_period_end"),
                        last_tsn_csn_update: row.get("last_tsn_csn_update"),
                        last_tsn_utilization: row.get("last_tsn_utilization"),
                        last_csn_utilization: row.get("last_csn_utilization"),
                        attachment_status: row.get("attachment_status"),
                        engine_thrust: row.get("engine_thrust"),
                        status: row.get("status"),
                        util_report_status: row.get("util_report_status"),
                        asset_status: row.get("asset_status"),
                        derate: row.get("derate"),
                    },
                    month: row.get("month"),
                    created_at_utc: row.get("created_at_utc"),
                });
        }

        let mut assets_by_lessee: HashMap<Uuid, Vec<AssetRecord>> = HashMap::new();
        for row in asset_rows {
            let id: Uuid = row.get("id");
            let lessee_id: Uuid = row.get("lessee_id");
            assets_by_lessee
                .entry(lessee_id)
                .or_default()
                .push(AssetRecord {
                    id,
                    name: row.get("name"),
                    serial_number: row.get("serial_number"),
                    registration_number: row.get("registration_number"),
                    validation_status: row.get("validation_status"),
                    report_status: row.get("report_status"),
                    obligation_status: row.get("obligation_status"),
                    month: row.get("month"),
                    created_at_utc: row.get("created_at_utc"),
                    components: components_by_asset.remove(&id).unwrap_or_default(),
                });
        }

        let mut lessees = Vec::with_capacity(rows.len());
        for row in rows {
            let id: Uuid = row.get("id");
            lessees.push(LesseeRecord {
                id,
                name: row.get("name"),
                month: row.get("month"),
                file_name: row.get("file_name"),
                created_at_utc: row.get("created_at_utc"),
                assets: assets_by_lessee.remove(&id).unwrap_or_default(),
            });
        }

        Ok(lessees)
    }
}

#[async_trait]
impl OperationsRepository for PgOperationsRepository {
    async fn month_exists(&self, month: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 AS present FROM lessee WHERE month = $1 LIMIT 1")
            .bind(month)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.is_some())
    }

    async fn save(&self, request: &SaveOperationsRequest) -> Result<SaveOperationsOutcome> {
        let mut outcome = SaveOperationsOutcome::default();

        for lessee in &request.lessees {
            let lessee_id = match self
                .insert_lessee(&lessee.lessee_name, &request.month, &request.file_name)
                .await
            {
                Ok(id) => {
                    outcome.saved_lessees += 1;
                    id
                }
                Err(e) => {
                    let msg = format!("Error saving lessee {}: {}", lessee.lessee_name, e);
                    warn!(
                        subsystem = "db",
                        component = "operations",
                        op = "save_batch",
                        month = %request.month,
                        "{msg}"
                    );
                    outcome.errors.push(msg);
                    continue;
                }
            };

            for asset in &lessee.assets {
                let asset_id = match self.insert_asset(lessee_id, asset, &request.month).await {
                    Ok(id) => {
                        outcome.saved_assets += 1;
                        id
                    }
                    Err(e) => {
                        let msg = format!("Error saving asset {}: {}", asset.serial_number, e);
                        warn!(
                            subsystem = "db",
                            component = "operations",
                            op = "save_batch",
                            month = %request.month,
                            "{msg}"
                        );
                        outcome.errors.push(msg);
                        continue;
                    }
                };

                for component in &asset.components {
                    match self.insert_component(asset_id, component, &request.month).await {
                        Ok(_) => outcome.saved_components += 1,
                        Err(e) => {
                            let msg = format!(
                                "Error saving component {}: {}",
                                component.serial_number, e
                            );
                            warn!(
                                subsystem = "db",
                                component = "operations",
                                op = "save_batch",
                                month = %request.month,
                                "{msg}"
                            );
                            outcome.errors.push(msg);
                        }
                    }
                }
            }
        }

        info!(
            subsystem = "db",
            component = "operations",
            op = "save_batch",
            month = %request.month,
            file_name = %request.file_name,
            saved_lessees = outcome.saved_lessees,
            saved_assets = outcome.saved_assets,
            saved_components = outcome.saved_components,
            error_count = outcome.errors.len(),
            "Batch save finished"
        );

        Ok(outcome)
    }

    async fn list_by_month(&self, month: &str) -> Result<Vec<LesseeRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, month, file_name, created_at_utc
            FROM lessee
            WHERE month = $1
            ORDER BY created_at_utc
            "#,
        )
        .bind(month)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.assemble_lessees(rows).await
    }

    async fn list_all(&self) -> Result<Vec<LesseeRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, month, file_name, created_at_utc
            FROM lessee
            ORDER BY created_at_utc
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.assemble_lessees(rows).await
    }

    async fn delete_by_month(&self, month: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lessee WHERE month = $1")
            .bind(month)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;

        let deleted = result.rows_affected() > 0;
        info!(
            subsystem = "db",
            component = "operations",
            op = "delete_by_month",
            month,
            rows = result.rows_affected(),
            "Partition delete"
        );
        Ok(deleted)
    }

    async fn find_lessee_by_name(&self, name: &str) -> Result<Option<LesseeRecord>> {
        // Linear scan with case-insensitive equality against both candidate
        // name fields, first match wins. Fine at operational-report volumes.
        let needle = name.to_lowercase();
        let lessees = self.list_all().await?;

        Ok(lessees.into_iter().find(|lessee| {
            lessee.name.to_lowercase() == needle
                || lessee
                    .assets
                    .iter()
                    .any(|asset| asset.name.to_lowercase() == needle)
        }))
    }
}
