//! Trial result storage.
//!
//! One patient's recorded outcome within a trial.

use serde::{Deserialize, Serialize};
use sqlx_core::query::query;
use sqlx_core::query_as::query_as;

use crate::error::{StorageError, StorageResult};
use crate::PgPool;

// =============================================================================
// Types
// =============================================================================

/// Trial result record from the database.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrialResultRow {
    #[serde(rename = "IDRezultat")]
    pub id: i32,
    #[serde(rename = "IDPacient")]
    pub id_pacient: i32,
    #[serde(rename = "IDTestare")]
    pub id_testare: i32,
    #[serde(rename = "Observatii")]
    pub observatii: Option<String>,
    #[serde(rename = "ReactiiAdverse")]
    pub reactii_adverse: Option<String>,
}

type TrialResultTuple = (i32, i32, i32, Option<String>, Option<String>);

impl TrialResultRow {
    fn from_tuple(row: TrialResultTuple) -> Self {
        Self {
            id: row.0,
            id_pacient: row.1,
            id_testare: row.2,
            observatii: row.3,
            reactii_adverse: row.4,
        }
    }
}

/// Trial result create/update payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrialResultInput {
    #[serde(rename = "IDPacient")]
    pub id_pacient: Option<i32>,
    #[serde(rename = "IDTestare")]
    pub id_testare: Option<i32>,
    #[serde(rename = "Observatii")]
    pub observatii: Option<String>,
    #[serde(rename = "ReactiiAdverse")]
    pub reactii_adverse: Option<String>,
}

/// Trial result joined with patient and trial display names.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrialResultDetail {
    #[serde(rename = "IDRezultat")]
    pub id: i32,
    #[serde(rename = "NumePacient")]
    pub nume_pacient: Option<String>,
    #[serde(rename = "NumeTestare")]
    pub nume_testare: Option<String>,
    #[serde(rename = "Observatii")]
    pub observatii: Option<String>,
    #[serde(rename = "ReactiiAdverse")]
    pub reactii_adverse: Option<String>,
}

type DetailTuple = (i32, Option<String>, Option<String>, Option<String>, Option<String>);

impl TrialResultDetail {
    fn from_tuple(row: DetailTuple) -> Self {
        Self {
            id: row.0,
            nume_pacient: row.1,
            nume_testare: row.2,
            observatii: row.3,
            reactii_adverse: row.4,
        }
    }
}

/// Per-trial aggregation of result and adverse-reaction counts.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TrialStatistics {
    #[serde(rename = "NumeTestare")]
    pub nume_testare: String,
    #[serde(rename = "FazaTest")]
    pub faza_test: Option<String>,
    #[serde(rename = "Medicament")]
    pub medicament: Option<String>,
    #[serde(rename = "NumeMedic")]
    pub nume_medic: Option<String>,
    #[serde(rename = "NumarRezultate")]
    pub numar_rezultate: i64,
    #[serde(rename = "NumarReactiiAdverse")]
    pub numar_reactii_adverse: i64,
}

// =============================================================================
// Trial Result Storage
// =============================================================================

/// Trial result storage operations.
pub struct TrialResultStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> TrialResultStorage<'a> {
    /// Creates a new trial result storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists all results with patient and trial display names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn detailed(&self) -> StorageResult<Vec<TrialResultDetail>> {
        let rows: Vec<DetailTuple> = query_as(
            r#"
            SELECT
                r.IDRezultat,
                CONCAT(p.Nume, ' ', p.Prenume) AS NumePacient,
                tc.Nume AS NumeTestare,
                r.Observatii,
                r.ReactiiAdverse
            FROM RezultatTestare r
            JOIN Pacienti p ON r.IDPacient = p.IDPacient
            JOIN TestareClinica tc ON r.IDTestare = tc.IDTestare
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(TrialResultDetail::from_tuple)
            .collect())
    }

    /// Inserts a new result, returning the full inserted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, input: &TrialResultInput) -> StorageResult<TrialResultRow> {
        let row: TrialResultTuple = query_as(
            r#"
            INSERT INTO RezultatTestare (IDPacient, IDTestare, Observatii, ReactiiAdverse)
            VALUES ($1, $2, $3, $4)
            RETURNING IDRezultat, IDPacient, IDTestare, Observatii, ReactiiAdverse
            "#,
        )
        .bind(input.id_pacient)
        .bind(input.id_testare)
        .bind(input.observatii.as_deref())
        .bind(input.reactii_adverse.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(TrialResultRow::from_tuple(row))
    }

    /// Updates a result by id, returning the updated row.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row matched the id.
    pub async fn update(&self, id: i32, input: &TrialResultInput) -> StorageResult<TrialResultRow> {
        let row: Option<TrialResultTuple> = query_as(
            r#"
            UPDATE RezultatTestare
            SET IDPacient = $2, IDTestare = $3, Observatii = $4, ReactiiAdverse = $5
            WHERE IDRezultat = $1
            RETURNING IDRezultat, IDPacient, IDTestare, Observatii, ReactiiAdverse
            "#,
        )
        .bind(id)
        .bind(input.id_pacient)
        .bind(input.id_testare)
        .bind(input.observatii.as_deref())
        .bind(input.reactii_adverse.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.map(TrialResultRow::from_tuple)
            .ok_or_else(|| StorageError::not_found(format!("RezultatTestare {id}")))
    }

    /// Deletes a result by id.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no row was affected.
    pub async fn delete(&self, id: i32) -> StorageResult<()> {
        let result = query("DELETE FROM RezultatTestare WHERE IDRezultat = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(format!("RezultatTestare {id}")));
        }

        Ok(())
    }

    /// Results whose adverse-reaction text contains the given fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn filter_by_adverse_reaction(
        &self,
        search: &str,
    ) -> StorageResult<Vec<TrialResultDetail>> {
        let rows: Vec<DetailTuple> = query_as(
            r#"
            SELECT
                r.IDRezultat,
                (SELECT CONCAT(p.Nume, ' ', p.Prenume)
                   FROM Pacienti p WHERE p.IDPacient = r.IDPacient) AS NumePacient,
                (SELECT tc.Nume
                   FROM TestareClinica tc WHERE tc.IDTestare = r.IDTestare) AS NumeTestare,
                r.Observatii,
                r.ReactiiAdverse
            FROM RezultatTestare r
            WHERE r.ReactiiAdverse LIKE '%' || $1 || '%'
            "#,
        )
        .bind(search)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(TrialResultDetail::from_tuple)
            .collect())
    }

    /// Per-trial result and adverse-reaction counts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn statistics(&self) -> StorageResult<Vec<TrialStatistics>> {
        let rows: Vec<(
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            i64,
            i64,
        )> = query_as(
            r#"
            SELECT
                tc.Nume AS NumeTestare,
                tc.FazaTest,
                m.Denumire AS Medicament,
                CONCAT(md.Nume, ' ', md.Prenume) AS NumeMedic,
                COUNT(rt.IDRezultat) AS NumarRezultate,
                SUM(CASE WHEN rt.ReactiiAdverse IS NOT NULL THEN 1 ELSE 0 END) AS NumarReactiiAdverse
            FROM TestareClinica tc
            LEFT JOIN Medicamente m ON tc.IDMedicament = m.IDMedicament
            LEFT JOIN Medic md ON tc.IDMedic = md.IDMedic
            LEFT JOIN RezultatTestare rt ON tc.IDTestare = rt.IDTestare
            LEFT JOIN Pacienti p ON rt.IDPacient = p.IDPacient
            GROUP BY tc.Nume, tc.FazaTest, m.Denumire, md.Nume, md.Prenume
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TrialStatistics {
                nume_testare: row.0,
                faza_test: row.1,
                medicament: row.2,
                nume_medic: row.3,
                numar_rezultate: row.4,
                numar_reactii_adverse: row.5,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_detail_serializes_with_api_field_names() {
        let detail = TrialResultDetail::from_tuple((
            11,
            Some("Popescu Ion".into()),
            Some("Faza II antiviral".into()),
            None,
            Some("cefalee".into()),
        ));
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["IDRezultat"], 11);
        assert_eq!(json["NumePacient"], "Popescu Ion");
        assert_eq!(json["ReactiiAdverse"], "cefalee");
        assert_eq!(json["Observatii"], serde_json::Value::Null);
    }

    #[test]
    fn statistics_serializes_counts_as_numbers() {
        let stats = TrialStatistics {
            nume_testare: "T1".into(),
            faza_test: Some("I".into()),
            medicament: None,
            nume_medic: Some("Ionescu Maria".into()),
            numar_rezultate: 4,
            numar_reactii_adverse: 1,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["NumarRezultate"], 4);
        assert_eq!(json["NumarReactiiAdverse"], 1);
    }
}
