//! Clinical trial storage.
//!
//! A trial with a NULL end date is in progress.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use crate::error::{StorageError, StorageResult};
use crate::PgPool;

// =============================================================================
// Types
// =============================================================================

/// Trial record from the database.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrialRow {
    #[serde(rename = "IDTestare")]
    pub id: i32,
    #[serde(rename = "Nume")]
    pub nume: String,
    #[serde(rename = "IDMedicament")]
    pub id_medicament: Option<i32>,
    #[serde(rename = "Data_Inceput")]
    pub data_inceput: NaiveDate,
    #[serde(rename = "Data_Sfarsit")]
    pub data_sfarsit: Option<NaiveDate>,
    #[serde(rename = "FazaTest")]
    pub faza_test: Option<String>,
    #[serde(rename = "IDMedic")]
    pub id_medic: Option<i32>,
}

type TrialTuple = (
    i32,
    String,
    Option<i32>,
    NaiveDate,
    Option<NaiveDate>,
    Option<String>,
    Option<i32>,
);

impl TrialRow {
    fn from_tuple(row: TrialTuple) -> Self {
        Self {
            id: row.0,
            nume: row.1,
            id_medicament: row.2,
            data_inceput: row.3,
            data_sfarsit: row.4,
            faza_test: row.5,
            id_medic: row.6,
        }
    }
}

/// Trial create/update payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrialInput {
    #[serde(rename = "Nume")]
    pub nume: Option<String>,
    #[serde(rename = "IDMedicament")]
    pub id_medicament: Option<i32>,
    #[serde(rename = "Data_Inceput")]
    pub data_inceput: Option<String>,
    #[serde(rename = "Data_Sfarsit")]
    pub data_sfarsit: Option<String>,
    #[serde(rename = "FazaTest")]
    pub faza_test: Option<String>,
    #[serde(rename = "IDMedic")]
    pub id_medic: Option<i32>,
}

/// Trial joined with drug and responsible-doctor display names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrialDetail {
    #[serde(rename = "IDTestare")]
    pub id: i32,
    #[serde(rename = "Nume")]
    pub nume: String,
    #[serde(rename = "Data_Inceput")]
    pub data_inceput: NaiveDate,
    #[serde(rename = "Data_Sfarsit")]
    pub data_sfarsit: Option<NaiveDate>,
    #[serde(rename = "FazaTest")]
    pub faza_test: Option<String>,
    #[serde(rename = "Medicament")]
    pub medicament: Option<String>,
    #[serde(rename = "Medic")]
    pub medic: Option<String>,
}

/// An in-progress trial with display names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InProgressTrial {
    #[serde(rename = "IDTestare")]
    pub id: i32,
    #[serde(rename = "NumeTestare")]
    pub nume_testare: String,
    #[serde(rename = "Data_Inceput")]
    pub data_inceput: NaiveDate,
    #[serde(rename = "Data_Sfarsit")]
    pub data_sfarsit: Option<NaiveDate>,
    #[serde(rename = "Medicament")]
    pub medicament: Option<String>,
    #[serde(rename = "MedicResponsabil")]
    pub medic_responsabil: Option<String>,
}

/// Per-trial count of enrolled patients.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrialPatientCount {
    #[serde(rename = "NumeTestare")]
    pub nume_testare: String,
    #[serde(rename = "FazaTest")]
    pub faza_test: Option<String>,
    #[serde(rename = "Medicament")]
    pub medicament: Option<String>,
    #[serde(rename = "NumarPacienti")]
    pub numar_pacienti: i64,
}

/// A trial row for the started-before filter.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FilteredTrial {
    #[serde(rename = "IDTestare")]
    pub id: i32,
    #[serde(rename = "NumeTestare")]
    pub nume_testare: String,
    #[serde(rename = "FazaTest")]
    pub faza_test: Option<String>,
    #[serde(rename = "Data_Inceput")]
    pub data_inceput: NaiveDate,
    #[serde(rename = "Data_Sfarsit")]
    pub data_sfarsit: Option<NaiveDate>,
    #[serde(rename = "Medicament")]
    pub medicament: Option<String>,
}

// =============================================================================
// Trial Storage
// =============================================================================

/// Clinical trial storage operations.
pub struct TrialStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> TrialStorage<'a> {
    /// Creates a new trial storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists all trials with drug and doctor display names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn detailed(&self) -> StorageResult<Vec<TrialDetail>> {
        let rows: Vec<(
            i32,
            String,
            NaiveDate,
            Option<NaiveDate>,
            Option<String>,
            Option<String>,
            Option<String>,
        )> = query_as(
            r#"
            SELECT
                tc.IDTestare,
                tc.Nume,
                tc.Data_Inceput,
                tc.Data_Sfarsit,
                tc.FazaTest,
                m.Denumire AS Medicament,
                CONCAT(md.Nume, ' ', md.Prenume) AS Medic
            FROM TestareClinica tc
            LEFT JOIN Medicamente m ON tc.IDMedicament = m.IDMedicament
            LEFT JOIN Medic md ON tc.IDMedic = md.IDMedic
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TrialDetail {
                id: row.0,
                nume: row.1,
                data_inceput: row.2,
                data_sfarsit: row.3,
                faza_test: row.4,
                medicament: row.5,
                medic: row.6,
            })
            .collect())
    }

    /// Inserts a new trial, returning the full inserted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: &TrialInput) -> StorageResult<TrialRow> {
        let row: TrialTuple = query_as(
            r#"
            INSERT INTO TestareClinica (Nume, IDMedicament, Data_Inceput, Data_Sfarsit, FazaTest, IDMedic)
            VALUES ($1, $2, $3::date, $4::date, $5, $6)
            RETURNING IDTestare, Nume, IDMedicament, Data_Inceput, Data_Sfarsit, FazaTest, IDMedic
            "#,
        )
        .bind(input.nume.as_deref())
        .bind(input.id_medicament)
        .bind(input.data_inceput.as_deref())
        .bind(input.data_sfarsit.as_deref())
        .bind(input.faza_test.as_deref())
        .bind(input.id_medic)
        .fetch_one(self.pool)
        .await?;

        Ok(TrialRow::from_tuple(row))
    }

    /// Updates a trial by id, returning the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row matched the id.
    pub async fn update(&self, id: i32, input: &TrialInput) -> StorageResult<TrialRow> {
        let row: Option<TrialTuple> = query_as(
            r#"
            UPDATE TestareClinica
            SET Nume = $2, IDMedicament = $3, Data_Inceput = $4::date,
                Data_Sfarsit = $5::date, FazaTest = $6, IDMedic = $7
            WHERE IDTestare = $1
            RETURNING IDTestare, Nume, IDMedicament, Data_Inceput, Data_Sfarsit, FazaTest, IDMedic
            "#,
        )
        .bind(id)
        .bind(input.nume.as_deref())
        .bind(input.id_medicament)
        .bind(input.data_inceput.as_deref())
        .bind(input.data_sfarsit.as_deref())
        .bind(input.faza_test.as_deref())
        .bind(input.id_medic)
        .fetch_optional(self.pool)
        .await?;

        row.map(TrialRow::from_tuple)
            .ok_or_else(|| StorageError::not_found(format!("TestareClinica {id}")))
    }

    /// Deletes a trial by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row was affected.
    pub async fn delete(&self, id: i32) -> StorageResult<()> {
        let result = query("DELETE FROM TestareClinica WHERE IDTestare = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!("TestareClinica {id}")));
        }

        Ok(())
    }

    /// Trials still in progress (no end date), most recently started first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn in_progress(&self) -> StorageResult<Vec<InProgressTrial>> {
        let rows: Vec<(
            i32,
            String,
            NaiveDate,
            Option<NaiveDate>,
            Option<String>,
            Option<String>,
        )> = query_as(
            r#"
            SELECT
                tc.IDTestare,
                tc.Nume AS NumeTestare,
                tc.Data_Inceput,
                tc.Data_Sfarsit,
                m.Denumire AS Medicament,
                CONCAT(md.Nume, ' ', md.Prenume) AS MedicResponsabil
            FROM TestareClinica tc
            LEFT JOIN Medicamente m ON tc.IDMedicament = m.IDMedicament
            LEFT JOIN Medic md ON tc.IDMedic = md.IDMedic
            WHERE tc.Data_Sfarsit IS NULL
            ORDER BY tc.Data_Inceput DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| InProgressTrial {
                id: row.0,
                nume_testare: row.1,
                data_inceput: row.2,
                data_sfarsit: row.3,
                medicament: row.4,
                medic_responsabil: row.5,
            })
            .collect())
    }

    /// Per-trial patient counts, most enrolled first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn patient_counts(&self) -> StorageResult<Vec<TrialPatientCount>> {
        let rows: Vec<(String, Option<String>, Option<String>, i64)> = query_as(
            r#"
            SELECT
                tc.Nume AS NumeTestare,
                tc.FazaTest,
                m.Denumire AS Medicament,
                COUNT(p.IDPacient) AS NumarPacienti
            FROM TestareClinica tc
            LEFT JOIN Medicamente m ON tc.IDMedicament = m.IDMedicament
            LEFT JOIN RezultatTestare rt ON tc.IDTestare = rt.IDTestare
            LEFT JOIN Pacienti p ON rt.IDPacient = p.IDPacient
            GROUP BY tc.Nume, tc.FazaTest, m.Denumire
            ORDER BY NumarPacienti DESC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TrialPatientCount {
                nume_testare: row.0,
                faza_test: row.1,
                medicament: row.2,
                numar_pacienti: row.3,
            })
            .collect())
    }

    /// Trials that started strictly before the given date, newest first.
    ///
    /// The date arrives as text and is cast by the database; a malformed
    /// value fails the statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn started_before(&self, date: &str) -> StorageResult<Vec<FilteredTrial>> {
        let rows: Vec<(
            i32,
            String,
            Option<String>,
            NaiveDate,
            Option<NaiveDate>,
            Option<String>,
        )> = query_as(
            r#"
            SELECT
                tc.IDTestare,
                tc.Nume AS NumeTestare,
                tc.FazaTest,
                tc.Data_Inceput,
                tc.Data_Sfarsit,
                m.Denumire AS Medicament
            FROM TestareClinica tc
            LEFT JOIN Medicamente m ON tc.IDMedicament = m.IDMedicament
            WHERE tc.Data_Inceput < $1::date
            ORDER BY tc.Data_Inceput DESC
            "#,
        )
        .bind(date)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| FilteredTrial {
                id: row.0,
                nume_testare: row.1,
                faza_test: row.2,
                data_inceput: row.3,
                data_sfarsit: row.4,
                medicament: row.5,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_row_serializes_with_api_field_names() {
        let row = TrialRow::from_tuple((
            9,
            "Faza II antiviral".into(),
            Some(3),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            None,
            Some("II".into()),
            None,
        ));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["IDTestare"], 9);
        assert_eq!(json["IDMedicament"], 3);
        assert_eq!(json["Data_Inceput"], "2024-06-01");
        assert_eq!(json["Data_Sfarsit"], serde_json::Value::Null);
        assert_eq!(json["FazaTest"], "II");
    }

    #[test]
    fn trial_input_accepts_nullable_references() {
        let input: TrialInput =
            serde_json::from_str(r#"{"Nume":"T1","Data_Inceput":"2024-01-01"}"#).unwrap();
        assert_eq!(input.nume.as_deref(), Some("T1"));
        assert!(input.id_medicament.is_none());
        assert!(input.id_medic.is_none());
    }
}
