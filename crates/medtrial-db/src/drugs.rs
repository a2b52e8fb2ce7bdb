//! Drug storage.
//!
//! Both listings project the manufacturer display name through a LEFT
//! JOIN so drugs without a manufacturer still appear.

use serde::Serialize;
use sqlx_core::query_as::query_as;

use crate::error::StorageResult;
use crate::PgPool;

/// Drug row joined with its manufacturer's name.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DrugWithManufacturer {
    #[serde(rename = "IDMedicament")]
    pub id: i32,
    #[serde(rename = "Denumire")]
    pub denumire: String,
    #[serde(rename = "Descriere")]
    pub descriere: Option<String>,
    #[serde(rename = "Pret")]
    pub pret: Option<f64>,
    #[serde(rename = "NumeProducator")]
    pub nume_producator: Option<String>,
}

type DrugTuple = (i32, String, Option<String>, Option<f64>, Option<String>);

impl DrugWithManufacturer {
    fn from_tuple(row: DrugTuple) -> Self {
        Self {
            id: row.0,
            denumire: row.1,
            descriere: row.2,
            pret: row.3,
            nume_producator: row.4,
        }
    }
}

/// Drug storage operations.
pub struct DrugStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> DrugStorage<'a> {
    /// Creates a new drug storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists all drugs with their manufacturer name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> StorageResult<Vec<DrugWithManufacturer>> {
        let rows: Vec<DrugTuple> = query_as(
            r#"
            SELECT
                M.IDMedicament,
                M.Denumire,
                M.Descriere,
                M.Pret,
                P.Nume AS NumeProducator
            FROM Medicamente M
            LEFT JOIN Producator P ON M.IDProducator = P.IDProducator
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(DrugWithManufacturer::from_tuple)
            .collect())
    }

    /// Drugs priced strictly above the average price across all drugs.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn priced_above_average(&self) -> StorageResult<Vec<DrugWithManufacturer>> {
        let rows: Vec<DrugTuple> = query_as(
            r#"
            SELECT
                M.IDMedicament,
                M.Denumire,
                M.Descriere,
                M.Pret,
                P.Nume AS NumeProducator
            FROM Medicamente M
            LEFT JOIN Producator P ON M.IDProducator = P.IDProducator
            WHERE M.Pret > (
                SELECT AVG(Pret)
                FROM Medicamente
            )
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(DrugWithManufacturer::from_tuple)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drug_row_serializes_with_api_field_names() {
        let row = DrugWithManufacturer::from_tuple((
            5,
            "Paracetamol".into(),
            None,
            Some(12.5),
            Some("Terapia".into()),
        ));
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["IDMedicament"], 5);
        assert_eq!(json["Denumire"], "Paracetamol");
        assert_eq!(json["Pret"], 12.5);
        assert_eq!(json["NumeProducator"], "Terapia");
        assert_eq!(json["Descriere"], serde_json::Value::Null);
    }
}
