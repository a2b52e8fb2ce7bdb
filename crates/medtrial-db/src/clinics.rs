//! Clinic storage.
//!
//! `Capacitate` is stored as text and cast to integer inside the
//! above-average query; the stored type is part of the pre-existing
//! schema and is deliberately not changed here.

use serde::{Deserialize, Serialize};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use crate::error::{StorageError, StorageResult};
use crate::PgPool;

/// Clinic record from the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClinicRow {
    #[serde(rename = "IDCabinet")]
    pub id: i32,
    #[serde(rename = "NumeCabinet")]
    pub nume_cabinet: String,
    #[serde(rename = "Locatie")]
    pub locatie: String,
    #[serde(rename = "Capacitate")]
    pub capacitate: String,
}

type ClinicTuple = (i32, String, String, String);

impl ClinicRow {
    fn from_tuple(row: ClinicTuple) -> Self {
        Self {
            id: row.0,
            nume_cabinet: row.1,
            locatie: row.2,
            capacitate: row.3,
        }
    }
}

/// Clinic create/update payload. All three fields are required and
/// checked in the server crate before any statement is issued.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClinicInput {
    #[serde(rename = "NumeCabinet")]
    pub nume_cabinet: Option<String>,
    #[serde(rename = "Locatie")]
    pub locatie: Option<String>,
    #[serde(rename = "Capacitate")]
    pub capacitate: Option<String>,
}

/// Clinic storage operations.
pub struct ClinicStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> ClinicStorage<'a> {
    /// Creates a new clinic storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists all clinics, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> StorageResult<Vec<ClinicRow>> {
        let rows: Vec<ClinicTuple> = query_as(
            r#"
            SELECT IDCabinet, NumeCabinet, Locatie, Capacitate
            FROM CabinetTestare
            ORDER BY IDCabinet DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ClinicRow::from_tuple).collect())
    }

    /// Inserts a new clinic, returning the full inserted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: &ClinicInput) -> StorageResult<ClinicRow> {
        let row: ClinicTuple = query_as(
            r#"
            INSERT INTO CabinetTestare (NumeCabinet, Locatie, Capacitate)
            VALUES ($1, $2, $3)
            RETURNING IDCabinet, NumeCabinet, Locatie, Capacitate
            "#,
        )
        .bind(input.nume_cabinet.as_deref())
        .bind(input.locatie.as_deref())
        .bind(input.capacitate.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(ClinicRow::from_tuple(row))
    }

    /// Updates a clinic by id, returning the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row matched the id.
    pub async fn update(&self, id: i32, input: &ClinicInput) -> StorageResult<ClinicRow> {
        let row: Option<ClinicTuple> = query_as(
            r#"
            UPDATE CabinetTestare
            SET NumeCabinet = $2, Locatie = $3, Capacitate = $4
            WHERE IDCabinet = $1
            RETURNING IDCabinet, NumeCabinet, Locatie, Capacitate
            "#,
        )
        .bind(id)
        .bind(input.nume_cabinet.as_deref())
        .bind(input.locatie.as_deref())
        .bind(input.capacitate.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.map(ClinicRow::from_tuple)
            .ok_or_else(|| StorageError::not_found(format!("CabinetTestare {id}")))
    }

    /// Deletes a clinic by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row was affected.
    pub async fn delete(&self, id: i32) -> StorageResult<()> {
        let result = query("DELETE FROM CabinetTestare WHERE IDCabinet = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!("CabinetTestare {id}")));
        }

        Ok(())
    }

    /// Clinics whose capacity, parsed as an integer, strictly exceeds the
    /// mean capacity across all clinics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails (including rows whose
    /// capacity text is not a valid integer).
    pub async fn above_average_capacity(&self) -> StorageResult<Vec<ClinicRow>> {
        let rows: Vec<ClinicTuple> = query_as(
            r#"
            SELECT IDCabinet, NumeCabinet, Locatie, Capacitate
            FROM CabinetTestare
            WHERE Capacitate::integer > (
                SELECT AVG(Capacitate::integer)
                FROM CabinetTestare
            )
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(ClinicRow::from_tuple).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clinic_row_serializes_capacity_as_text() {
        let row = ClinicRow::from_tuple((2, "Central".into(), "Iasi".into(), "40".into()));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["IDCabinet"], 2);
        assert_eq!(json["Capacitate"], "40");
    }

    #[test]
    fn clinic_input_tolerates_missing_fields() {
        let input: ClinicInput = serde_json::from_str(r#"{"NumeCabinet":"Central"}"#).unwrap();
        assert_eq!(input.nume_cabinet.as_deref(), Some("Central"));
        assert!(input.locatie.is_none());
        assert!(input.capacitate.is_none());
    }
}
