//! Medical history storage.
//!
//! One entry per patient holding blood type, allergies and known
//! diseases.

use serde::{Deserialize, Serialize};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use crate::error::{StorageError, StorageResult};
use crate::PgPool;

// =============================================================================
// Types
// =============================================================================

/// Medical history record from the database.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MedicalHistoryRow {
    #[serde(rename = "IDIstoric_Medical")]
    pub id: i32,
    #[serde(rename = "IDPacient")]
    pub id_pacient: i32,
    #[serde(rename = "GrupaSanguina")]
    pub grupa_sanguina: String,
    #[serde(rename = "Alergii")]
    pub alergii: Option<String>,
    #[serde(rename = "Boli")]
    pub boli: Option<String>,
}

type HistoryTuple = (i32, i32, String, Option<String>, Option<String>);

impl MedicalHistoryRow {
    fn from_tuple(row: HistoryTuple) -> Self {
        Self {
            id: row.0,
            id_pacient: row.1,
            grupa_sanguina: row.2,
            alergii: row.3,
            boli: row.4,
        }
    }
}

/// Medical history create/update payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicalHistoryInput {
    #[serde(rename = "IDPacient")]
    pub id_pacient: Option<i32>,
    #[serde(rename = "GrupaSanguina")]
    pub grupa_sanguina: Option<String>,
    #[serde(rename = "Alergii")]
    pub alergii: Option<String>,
    #[serde(rename = "Boli")]
    pub boli: Option<String>,
}

/// History entry joined with the patient's display name.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MedicalHistoryDetail {
    #[serde(rename = "IDIstoric_Medical")]
    pub id: i32,
    #[serde(rename = "IDPacient")]
    pub id_pacient: i32,
    #[serde(rename = "NumePacient")]
    pub nume_pacient: Option<String>,
    #[serde(rename = "GrupaSanguina")]
    pub grupa_sanguina: String,
    #[serde(rename = "Alergii")]
    pub alergii: Option<String>,
    #[serde(rename = "Boli")]
    pub boli: Option<String>,
}

/// Blood-type filter projection (no patient id, per the API contract).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FilteredHistory {
    #[serde(rename = "IDIstoric_Medical")]
    pub id: i32,
    #[serde(rename = "NumePacient")]
    pub nume_pacient: String,
    #[serde(rename = "GrupaSanguina")]
    pub grupa_sanguina: String,
    #[serde(rename = "Alergii")]
    pub alergii: Option<String>,
    #[serde(rename = "Boli")]
    pub boli: Option<String>,
}

// =============================================================================
// Medical History Storage
// =============================================================================

/// Medical history storage operations.
pub struct MedicalHistoryStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> MedicalHistoryStorage<'a> {
    /// Creates a new medical history storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists all history entries with patient display names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn detailed(&self) -> StorageResult<Vec<MedicalHistoryDetail>> {
        let rows: Vec<(i32, i32, Option<String>, String, Option<String>, Option<String>)> =
            query_as(
                r#"
                SELECT
                    im.IDIstoric_Medical,
                    im.IDPacient,
                    CONCAT(p.Nume, ' ', p.Prenume) AS NumePacient,
                    im.GrupaSanguina,
                    im.Alergii,
                    im.Boli
                FROM IstoricMedical im
                LEFT JOIN Pacienti p ON im.IDPacient = p.IDPacient
                "#,
            )
            .fetch_all(self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| MedicalHistoryDetail {
                id: row.0,
                id_pacient: row.1,
                nume_pacient: row.2,
                grupa_sanguina: row.3,
                alergii: row.4,
                boli: row.5,
            })
            .collect())
    }

    /// Inserts a new history entry, returning the full inserted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: &MedicalHistoryInput) -> StorageResult<MedicalHistoryRow> {
        let row: HistoryTuple = query_as(
            r#"
            INSERT INTO IstoricMedical (IDPacient, GrupaSanguina, Alergii, Boli)
            VALUES ($1, $2, $3, $4)
            RETURNING IDIstoric_Medical, IDPacient, GrupaSanguina, Alergii, Boli
            "#,
        )
        .bind(input.id_pacient)
        .bind(input.grupa_sanguina.as_deref())
        .bind(input.alergii.as_deref())
        .bind(input.boli.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(MedicalHistoryRow::from_tuple(row))
    }

    /// Updates a history entry by id, returning the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row matched the id.
    pub async fn update(
        &self,
        id: i32,
        input: &MedicalHistoryInput,
    ) -> StorageResult<MedicalHistoryRow> {
        let row: Option<HistoryTuple> = query_as(
            r#"
            UPDATE IstoricMedical
            SET IDPacient = $2, GrupaSanguina = $3, Alergii = $4, Boli = $5
            WHERE IDIstoric_Medical = $1
            RETURNING IDIstoric_Medical, IDPacient, GrupaSanguina, Alergii, Boli
            "#,
        )
        .bind(id)
        .bind(input.id_pacient)
        .bind(input.grupa_sanguina.as_deref())
        .bind(input.alergii.as_deref())
        .bind(input.boli.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.map(MedicalHistoryRow::from_tuple)
            .ok_or_else(|| StorageError::not_found(format!("IstoricMedical {id}")))
    }

    /// Deletes a history entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row was affected.
    pub async fn delete(&self, id: i32) -> StorageResult<()> {
        let result = query("DELETE FROM IstoricMedical WHERE IDIstoric_Medical = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!("IstoricMedical {id}")));
        }

        Ok(())
    }

    /// History entries with the given blood type (exact match).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn filter_by_blood_type(
        &self,
        grupa_sanguina: &str,
    ) -> StorageResult<Vec<FilteredHistory>> {
        let rows: Vec<(i32, String, String, Option<String>, Option<String>)> = query_as(
            r#"
            SELECT
                im.IDIstoric_Medical,
                CONCAT(p.Nume, ' ', p.Prenume) AS NumePacient,
                im.GrupaSanguina,
                im.Alergii,
                im.Boli
            FROM IstoricMedical im
            INNER JOIN Pacienti p ON im.IDPacient = p.IDPacient
            WHERE im.GrupaSanguina = $1
            "#,
        )
        .bind(grupa_sanguina)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FilteredHistory {
                id: row.0,
                nume_pacient: row.1,
                grupa_sanguina: row.2,
                alergii: row.3,
                boli: row.4,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_row_serializes_with_api_field_names() {
        let row = MedicalHistoryRow::from_tuple((6, 1, "AB".into(), None, Some("astm".into())));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["IDIstoric_Medical"], 6);
        assert_eq!(json["IDPacient"], 1);
        assert_eq!(json["GrupaSanguina"], "AB");
        assert_eq!(json["Alergii"], serde_json::Value::Null);
        assert_eq!(json["Boli"], "astm");
    }

    #[test]
    fn history_input_accepts_partial_payload() {
        let input: MedicalHistoryInput =
            serde_json::from_str(r#"{"IDPacient":1,"GrupaSanguina":"0"}"#).unwrap();
        assert_eq!(input.id_pacient, Some(1));
        assert_eq!(input.grupa_sanguina.as_deref(), Some("0"));
        assert!(input.alergii.is_none());
    }
}
