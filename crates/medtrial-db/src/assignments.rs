//! Doctor-clinic assignment storage.
//!
//! An assignment is a time-bounded role a doctor holds at a clinic; a
//! NULL end date means the assignment is ongoing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use crate::error::{StorageError, StorageResult};
use crate::PgPool;

// =============================================================================
// Types
// =============================================================================

/// Assignment record from the database.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AssignmentRow {
    #[serde(rename = "IDMedic_Cabinet")]
    pub id: i32,
    #[serde(rename = "IDMedic")]
    pub id_medic: i32,
    #[serde(rename = "IDCabinet")]
    pub id_cabinet: i32,
    #[serde(rename = "Rol_medic")]
    pub rol_medic: Option<String>,
    #[serde(rename = "Data_Incepere_activitate")]
    pub data_incepere: NaiveDate,
    #[serde(rename = "Data_Finalizare_activitate")]
    pub data_finalizare: Option<NaiveDate>,
}

type AssignmentTuple = (i32, i32, i32, Option<String>, NaiveDate, Option<NaiveDate>);

impl AssignmentRow {
    fn from_tuple(row: AssignmentTuple) -> Self {
        Self {
            id: row.0,
            id_medic: row.1,
            id_cabinet: row.2,
            rol_medic: row.3,
            data_incepere: row.4,
            data_finalizare: row.5,
        }
    }
}

/// Assignment create/update payload. Dates stay strings and are cast by
/// the database; referential integrity is the database's job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentInput {
    #[serde(rename = "IDMedic")]
    pub id_medic: Option<i32>,
    #[serde(rename = "IDCabinet")]
    pub id_cabinet: Option<i32>,
    #[serde(rename = "Rol_medic")]
    pub rol_medic: Option<String>,
    #[serde(rename = "Data_Incepere_activitate")]
    pub data_incepere: Option<String>,
    #[serde(rename = "Data_Finalizare_activitate")]
    pub data_finalizare: Option<String>,
}

/// Assignment joined with doctor and clinic display names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AssignmentDetail {
    #[serde(rename = "IDMedic_Cabinet")]
    pub id: i32,
    #[serde(rename = "NumeMedic")]
    pub nume_medic: String,
    #[serde(rename = "PrenumeMedic")]
    pub prenume_medic: String,
    #[serde(rename = "NumeCabinet")]
    pub nume_cabinet: String,
    #[serde(rename = "Rol_medic")]
    pub rol_medic: Option<String>,
    #[serde(rename = "Data_Incepere_activitate")]
    pub data_incepere: NaiveDate,
    #[serde(rename = "Data_Finalizare_activitate")]
    pub data_finalizare: Option<NaiveDate>,
}

/// A finished assignment with its length in days.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivitySpan {
    #[serde(rename = "NumeMedic")]
    pub nume_medic: String,
    #[serde(rename = "PrenumeMedic")]
    pub prenume_medic: String,
    #[serde(rename = "NumeCabinet")]
    pub nume_cabinet: String,
    #[serde(rename = "ZileActivitate")]
    pub zile_activitate: i32,
}

/// A doctor with the number of distinct roles held across clinics.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoleCount {
    #[serde(rename = "NumeMedic")]
    pub nume_medic: String,
    #[serde(rename = "PrenumeMedic")]
    pub prenume_medic: String,
    #[serde(rename = "NumarRoluri")]
    pub numar_roluri: i64,
}

/// An ongoing assignment with doctor and clinic display names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActiveAssignment {
    #[serde(rename = "NumeMedic")]
    pub nume_medic: String,
    #[serde(rename = "PrenumeMedic")]
    pub prenume_medic: String,
    #[serde(rename = "NumeCabinet")]
    pub nume_cabinet: String,
    #[serde(rename = "DataIncepere")]
    pub data_incepere: NaiveDate,
}

// =============================================================================
// Assignment Storage
// =============================================================================

/// Doctor-clinic assignment storage operations.
pub struct AssignmentStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> AssignmentStorage<'a> {
    /// Creates a new assignment storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists all assignments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> StorageResult<Vec<AssignmentRow>> {
        let rows: Vec<AssignmentTuple> = query_as(
            r#"
            SELECT IDMedic_Cabinet, IDMedic, IDCabinet, Rol_medic,
                   Data_Incepere_activitate, Data_Finalizare_activitate
            FROM MedicCabinete
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(AssignmentRow::from_tuple).collect())
    }

    /// Inserts a new assignment, returning the full inserted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: &AssignmentInput) -> StorageResult<AssignmentRow> {
        let row: AssignmentTuple = query_as(
            r#"
            INSERT INTO MedicCabinete
                (IDMedic, IDCabinet, Rol_medic, Data_Incepere_activitate, Data_Finalizare_activitate)
            VALUES ($1, $2, $3, $4::date, $5::date)
            RETURNING IDMedic_Cabinet, IDMedic, IDCabinet, Rol_medic,
                      Data_Incepere_activitate, Data_Finalizare_activitate
            "#,
        )
        .bind(input.id_medic)
        .bind(input.id_cabinet)
        .bind(input.rol_medic.as_deref())
        .bind(input.data_incepere.as_deref())
        .bind(input.data_finalizare.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(AssignmentRow::from_tuple(row))
    }

    /// Updates an assignment by id, returning the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row matched the id.
    pub async fn update(&self, id: i32, input: &AssignmentInput) -> StorageResult<AssignmentRow> {
        let row: Option<AssignmentTuple> = query_as(
            r#"
            UPDATE MedicCabinete
            SET IDMedic = $2, IDCabinet = $3, Rol_medic = $4,
                Data_Incepere_activitate = $5::date, Data_Finalizare_activitate = $6::date
            WHERE IDMedic_Cabinet = $1
            RETURNING IDMedic_Cabinet, IDMedic, IDCabinet, Rol_medic,
                      Data_Incepere_activitate, Data_Finalizare_activitate
            "#,
        )
        .bind(id)
        .bind(input.id_medic)
        .bind(input.id_cabinet)
        .bind(input.rol_medic.as_deref())
        .bind(input.data_incepere.as_deref())
        .bind(input.data_finalizare.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.map(AssignmentRow::from_tuple)
            .ok_or_else(|| StorageError::not_found(format!("MedicCabinete {id}")))
    }

    /// Deletes an assignment by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row was affected.
    pub async fn delete(&self, id: i32) -> StorageResult<()> {
        let result = query("DELETE FROM MedicCabinete WHERE IDMedic_Cabinet = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!("MedicCabinete {id}")));
        }

        Ok(())
    }

    /// All assignments joined with doctor and clinic names, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn detailed(&self) -> StorageResult<Vec<AssignmentDetail>> {
        let rows: Vec<(
            i32,
            String,
            String,
            String,
            Option<String>,
            NaiveDate,
            Option<NaiveDate>,
        )> = query_as(
            r#"
            SELECT
                mc.IDMedic_Cabinet,
                m.Nume AS NumeMedic,
                m.Prenume AS PrenumeMedic,
                ct.NumeCabinet,
                mc.Rol_medic,
                mc.Data_Incepere_activitate,
                mc.Data_Finalizare_activitate
            FROM MedicCabinete mc
            INNER JOIN Medic m ON mc.IDMedic = m.IDMedic
            INNER JOIN CabinetTestare ct ON mc.IDCabinet = ct.IDCabinet
            ORDER BY mc.IDMedic_Cabinet
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| AssignmentDetail {
                id: row.0,
                nume_medic: row.1,
                prenume_medic: row.2,
                nume_cabinet: row.3,
                rol_medic: row.4,
                data_incepere: row.5,
                data_finalizare: row.6,
            })
            .collect())
    }

    /// Finished assignments with their day counts, longest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn longest_activity(&self) -> StorageResult<Vec<ActivitySpan>> {
        let rows: Vec<(String, String, String, i32)> = query_as(
            r#"
            SELECT
                m.Nume AS NumeMedic,
                m.Prenume AS PrenumeMedic,
                ct.NumeCabinet,
                mc.Data_Finalizare_activitate - mc.Data_Incepere_activitate AS ZileActivitate
            FROM Medic m
            INNER JOIN MedicCabinete mc ON m.IDMedic = mc.IDMedic
            INNER JOIN CabinetTestare ct ON mc.IDCabinet = ct.IDCabinet
            WHERE mc.Data_Finalizare_activitate IS NOT NULL
            ORDER BY ZileActivitate DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ActivitySpan {
                nume_medic: row.0,
                prenume_medic: row.1,
                nume_cabinet: row.2,
                zile_activitate: row.3,
            })
            .collect())
    }

    /// Doctors holding more than one distinct role, role-count descending.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn multiple_roles(&self) -> StorageResult<Vec<RoleCount>> {
        let rows: Vec<(String, String, i64)> = query_as(
            r#"
            SELECT
                m.Nume AS NumeMedic,
                m.Prenume AS PrenumeMedic,
                COUNT(DISTINCT mc.Rol_medic) AS NumarRoluri
            FROM Medic m
            INNER JOIN MedicCabinete mc ON m.IDMedic = mc.IDMedic
            GROUP BY m.IDMedic, m.Nume, m.Prenume
            HAVING COUNT(DISTINCT mc.Rol_medic) > 1
            ORDER BY NumarRoluri DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RoleCount {
                nume_medic: row.0,
                prenume_medic: row.1,
                numar_roluri: row.2,
            })
            .collect())
    }

    /// Ongoing assignments (no end date) with display names, ordered by
    /// doctor then clinic.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn active(&self) -> StorageResult<Vec<ActiveAssignment>> {
        let rows: Vec<(String, String, String, NaiveDate)> = query_as(
            r#"
            SELECT
                m.Nume AS NumeMedic,
                m.Prenume AS PrenumeMedic,
                c.NumeCabinet AS NumeCabinet,
                mc.Data_Incepere_activitate AS DataIncepere
            FROM Medic m
            INNER JOIN MedicCabinete mc ON m.IDMedic = mc.IDMedic
            INNER JOIN CabinetTestare c ON mc.IDCabinet = c.IDCabinet
            WHERE mc.Data_Finalizare_activitate IS NULL
            ORDER BY m.Nume, c.NumeCabinet
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ActiveAssignment {
                nume_medic: row.0,
                prenume_medic: row.1,
                nume_cabinet: row.2,
                data_incepere: row.3,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_row_serializes_with_api_field_names() {
        let row = AssignmentRow::from_tuple((
            4,
            1,
            2,
            Some("Coordonator".into()),
            NaiveDate::from_ymd_opt(2023, 1, 10).unwrap(),
            None,
        ));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["IDMedic_Cabinet"], 4);
        assert_eq!(json["Rol_medic"], "Coordonator");
        assert_eq!(json["Data_Incepere_activitate"], "2023-01-10");
        assert_eq!(
            json["Data_Finalizare_activitate"],
            serde_json::Value::Null
        );
    }

    #[test]
    fn assignment_input_accepts_partial_payload() {
        let input: AssignmentInput =
            serde_json::from_str(r#"{"IDMedic":1,"IDCabinet":2,"Rol_medic":"Asistent"}"#).unwrap();
        assert_eq!(input.id_medic, Some(1));
        assert_eq!(input.rol_medic.as_deref(), Some("Asistent"));
        assert!(input.data_finalizare.is_none());
    }
}
