//! Patient storage.
//!
//! Rows from the `Pacienti` table. Field-level validation (required
//! fields, sex code, CNP length) happens in the server crate before any
//! call lands here; everything else is deferred to the database.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use crate::error::{StorageError, StorageResult};
use crate::PgPool;

// =============================================================================
// Types
// =============================================================================

/// Patient record from the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientRow {
    #[serde(rename = "IDPacient")]
    pub id: i32,
    #[serde(rename = "Nume")]
    pub nume: String,
    #[serde(rename = "Prenume")]
    pub prenume: String,
    #[serde(rename = "Adresa")]
    pub adresa: Option<String>,
    #[serde(rename = "DataNasterii")]
    pub data_nasterii: NaiveDate,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "NrTelefon")]
    pub nr_telefon: String,
    #[serde(rename = "Mail")]
    pub mail: Option<String>,
    #[serde(rename = "CNP")]
    pub cnp: String,
}

type PatientTuple = (
    i32,
    String,
    String,
    Option<String>,
    NaiveDate,
    String,
    String,
    Option<String>,
    String,
);

impl PatientRow {
    fn from_tuple(row: PatientTuple) -> Self {
        Self {
            id: row.0,
            nume: row.1,
            prenume: row.2,
            adresa: row.3,
            data_nasterii: row.4,
            sex: row.5,
            nr_telefon: row.6,
            mail: row.7,
            cnp: row.8,
        }
    }
}

/// Patient create/update payload.
///
/// Every field is optional at the deserialization boundary so that
/// missing required fields surface as a 400 with a message, not as a
/// body-rejection. Dates stay strings here and are cast by the
/// database (`$n::date`), which reports malformed input as a statement
/// failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatientInput {
    #[serde(rename = "Nume")]
    pub nume: Option<String>,
    #[serde(rename = "Prenume")]
    pub prenume: Option<String>,
    #[serde(rename = "Adresa")]
    pub adresa: Option<String>,
    #[serde(rename = "DataNasterii")]
    pub data_nasterii: Option<String>,
    #[serde(rename = "Sex")]
    pub sex: Option<String>,
    #[serde(rename = "NrTelefon")]
    pub nr_telefon: Option<String>,
    #[serde(rename = "Mail")]
    pub mail: Option<String>,
    #[serde(rename = "CNP")]
    pub cnp: Option<String>,
}

/// Per-sex patient count over patients that have at least one trial result.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SexCount {
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "NumarPacienti")]
    pub numar_pacienti: i64,
}

// =============================================================================
// Patient Storage
// =============================================================================

/// Patient storage operations.
pub struct PatientStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> PatientStorage<'a> {
    /// Creates a new patient storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists all patients ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> StorageResult<Vec<PatientRow>> {
        let rows: Vec<PatientTuple> = query_as(
            r#"
            SELECT IDPacient, Nume, Prenume, Adresa, DataNasterii, Sex, NrTelefon, Mail, CNP
            FROM Pacienti
            ORDER BY IDPacient
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PatientRow::from_tuple).collect())
    }

    /// Inserts a new patient, returning the full inserted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: &PatientInput) -> StorageResult<PatientRow> {
        let row: PatientTuple = query_as(
            r#"
            INSERT INTO Pacienti (Nume, Prenume, Adresa, DataNasterii, Sex, NrTelefon, Mail, CNP)
            VALUES ($1, $2, $3, $4::date, $5, $6, $7, $8)
            RETURNING IDPacient, Nume, Prenume, Adresa, DataNasterii, Sex, NrTelefon, Mail, CNP
            "#,
        )
        .bind(input.nume.as_deref())
        .bind(input.prenume.as_deref())
        .bind(input.adresa.as_deref())
        .bind(input.data_nasterii.as_deref())
        .bind(input.sex.as_deref())
        .bind(input.nr_telefon.as_deref())
        .bind(input.mail.as_deref())
        .bind(input.cnp.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(PatientRow::from_tuple(row))
    }

    /// Updates a patient by id, returning the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row matched the id, or a
    /// database error if the statement fails.
    pub async fn update(&self, id: i32, input: &PatientInput) -> StorageResult<PatientRow> {
        let row: Option<PatientTuple> = query_as(
            r#"
            UPDATE Pacienti
            SET Nume = $2, Prenume = $3, Adresa = $4, DataNasterii = $5::date,
                Sex = $6, NrTelefon = $7, Mail = $8, CNP = $9
            WHERE IDPacient = $1
            RETURNING IDPacient, Nume, Prenume, Adresa, DataNasterii, Sex, NrTelefon, Mail, CNP
            "#,
        )
        .bind(id)
        .bind(input.nume.as_deref())
        .bind(input.prenume.as_deref())
        .bind(input.adresa.as_deref())
        .bind(input.data_nasterii.as_deref())
        .bind(input.sex.as_deref())
        .bind(input.nr_telefon.as_deref())
        .bind(input.mail.as_deref())
        .bind(input.cnp.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.map(PatientRow::from_tuple)
            .ok_or_else(|| StorageError::not_found(format!("Pacienti {id}")))
    }

    /// Deletes a patient by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row was affected.
    pub async fn delete(&self, id: i32) -> StorageResult<()> {
        let result = query("DELETE FROM Pacienti WHERE IDPacient = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!("Pacienti {id}")));
        }

        Ok(())
    }

    /// Patients whose address contains the given fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn filter_by_address(&self, address: &str) -> StorageResult<Vec<PatientRow>> {
        let rows: Vec<PatientTuple> = query_as(
            r#"
            SELECT IDPacient, Nume, Prenume, Adresa, DataNasterii, Sex, NrTelefon, Mail, CNP
            FROM Pacienti
            WHERE Adresa LIKE '%' || $1 || '%'
            "#,
        )
        .bind(address)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(PatientRow::from_tuple).collect())
    }

    /// Per-sex counts of patients that appear in at least one trial result.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn count_by_sex_with_results(&self) -> StorageResult<Vec<SexCount>> {
        let rows: Vec<(String, i64)> = query_as(
            r#"
            SELECT Sex, COUNT(*) AS NumarPacienti
            FROM Pacienti
            WHERE IDPacient IN (
                SELECT DISTINCT IDPacient
                FROM RezultatTestare
            )
            GROUP BY Sex
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(sex, numar_pacienti)| SexCount {
                sex,
                numar_pacienti,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patient_row_serializes_with_api_field_names() {
        let row = PatientRow::from_tuple((
            1,
            "Popescu".into(),
            "Ion".into(),
            Some("Str. Lunga 5".into()),
            NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            "M".into(),
            "0722000000".into(),
            None,
            "1900412123456".into(),
        ));

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["IDPacient"], 1);
        assert_eq!(json["Nume"], "Popescu");
        assert_eq!(json["DataNasterii"], "1990-04-12");
        assert_eq!(json["Mail"], serde_json::Value::Null);
        assert_eq!(json["CNP"], "1900412123456");
    }

    #[test]
    fn patient_input_tolerates_missing_fields() {
        let input: PatientInput = serde_json::from_str(r#"{"Nume":"Popescu"}"#).unwrap();
        assert_eq!(input.nume.as_deref(), Some("Popescu"));
        assert!(input.prenume.is_none());
        assert!(input.cnp.is_none());
    }
}
