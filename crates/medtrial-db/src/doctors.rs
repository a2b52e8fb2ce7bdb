//! Doctor storage.

use serde::Serialize;
use sqlx_core::query_as::query_as;

use crate::error::StorageResult;
use crate::PgPool;

/// Doctor record from the database.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DoctorRow {
    #[serde(rename = "IDMedic")]
    pub id: i32,
    #[serde(rename = "Nume")]
    pub nume: String,
    #[serde(rename = "Prenume")]
    pub prenume: String,
    #[serde(rename = "Mail")]
    pub mail: Option<String>,
    #[serde(rename = "Telefon")]
    pub telefon: Option<String>,
    #[serde(rename = "Experienta")]
    pub experienta: Option<i32>,
}

type DoctorTuple = (i32, String, String, Option<String>, Option<String>, Option<i32>);

impl DoctorRow {
    fn from_tuple(row: DoctorTuple) -> Self {
        Self {
            id: row.0,
            nume: row.1,
            prenume: row.2,
            mail: row.3,
            telefon: row.4,
            experienta: row.5,
        }
    }
}

/// Share of doctors with more than ten years of experience.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExperiencePercent {
    /// `NULL` when the doctor table is empty.
    #[serde(rename = "ProcentMediciPeste10Ani")]
    pub procent: Option<f64>,
}

/// Doctor storage operations.
pub struct DoctorStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> DoctorStorage<'a> {
    /// Creates a new doctor storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists all doctors.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> StorageResult<Vec<DoctorRow>> {
        let rows: Vec<DoctorTuple> = query_as(
            r#"
            SELECT IDMedic, Nume, Prenume, Mail, Telefon, Experienta
            FROM Medic
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(DoctorRow::from_tuple).collect())
    }

    /// Percentage of doctors with more than ten years of experience,
    /// rounded to two decimals. `None` when there are no doctors.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn experience_over_ten_percent(&self) -> StorageResult<ExperiencePercent> {
        let row: (Option<f64>,) = query_as(
            r#"
            SELECT ROUND(
                COUNT(CASE WHEN Experienta > 10 THEN 1 END)::numeric
                    / NULLIF(COUNT(*), 0) * 100,
                2
            )::float8 AS ProcentMediciPeste10Ani
            FROM Medic
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(ExperiencePercent { procent: row.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_row_serializes_with_api_field_names() {
        let row = DoctorRow::from_tuple((
            3,
            "Ionescu".into(),
            "Maria".into(),
            Some("maria@example.com".into()),
            None,
            Some(12),
        ));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["IDMedic"], 3);
        assert_eq!(json["Experienta"], 12);
        assert_eq!(json["Telefon"], serde_json::Value::Null);
    }

    #[test]
    fn empty_table_percent_is_null() {
        let pct = ExperiencePercent { procent: None };
        let json = serde_json::to_value(&pct).unwrap();
        assert_eq!(json["ProcentMediciPeste10Ani"], serde_json::Value::Null);
    }
}
