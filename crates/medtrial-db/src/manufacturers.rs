//! Manufacturer storage.
//!
//! The list query appends predicates only for the optional filters that
//! are present; filter values always travel as bind parameters. The sort
//! direction is the one piece of caller input that lands in the SQL text
//! itself, so it is constrained to the [`SortDirection`] allow-list.

use std::str::FromStr;

use serde::Serialize;
use sqlx_core::query_as::query_as;

use crate::error::StorageResult;
use crate::PgPool;

/// Allow-listed ORDER BY direction.
///
/// Parsed case-insensitively from `asc`/`desc`; anything else is
/// rejected before a statement is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// The fixed SQL keyword for this direction.
    #[must_use]
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("invalid sort direction '{other}'")),
        }
    }
}

/// Manufacturer record from the database.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ManufacturerRow {
    #[serde(rename = "IDProducator")]
    pub id: i32,
    #[serde(rename = "Nume")]
    pub nume: String,
    #[serde(rename = "Tara")]
    pub tara: String,
    #[serde(rename = "Mail")]
    pub mail: Option<String>,
    #[serde(rename = "Telefon")]
    pub telefon: Option<String>,
    #[serde(rename = "AdresaSediu")]
    pub adresa_sediu: Option<String>,
}

type ManufacturerTuple = (
    i32,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
);

impl ManufacturerRow {
    fn from_tuple(row: ManufacturerTuple) -> Self {
        Self {
            id: row.0,
            nume: row.1,
            tara: row.2,
            mail: row.3,
            telefon: row.4,
            adresa_sediu: row.5,
        }
    }
}

/// Manufacturer row with a computed drug-association flag.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ManufacturerWithDrugFlag {
    #[serde(flatten)]
    pub manufacturer: ManufacturerRow,
    /// `Da` when at least one drug references this manufacturer, else `Nu`.
    #[serde(rename = "MedicamenteAsociate")]
    pub medicamente_asociate: String,
}

/// Manufacturer storage operations.
pub struct ManufacturerStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> ManufacturerStorage<'a> {
    /// Creates a new manufacturer storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Lists manufacturers, optionally narrowed by a name fragment and an
    /// exact country match, optionally ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn search(
        &self,
        nume: Option<&str>,
        tara: Option<&str>,
        sort: Option<SortDirection>,
    ) -> StorageResult<Vec<ManufacturerRow>> {
        let mut sql = String::from(
            "SELECT IDProducator, Nume, Tara, Mail, Telefon, AdresaSediu \
             FROM Producator WHERE 1=1",
        );

        let mut bind_idx = 0;
        if nume.is_some() {
            bind_idx += 1;
            sql.push_str(&format!(" AND Nume LIKE '%' || ${bind_idx} || '%'"));
        }
        if tara.is_some() {
            bind_idx += 1;
            sql.push_str(&format!(" AND Tara = ${bind_idx}"));
        }
        if let Some(direction) = sort {
            sql.push_str(" ORDER BY Nume ");
            sql.push_str(direction.as_sql());
        }

        let mut q = query_as::<_, ManufacturerTuple>(&sql);
        if let Some(nume) = nume {
            q = q.bind(nume);
        }
        if let Some(tara) = tara {
            q = q.bind(tara);
        }

        let rows = q.fetch_all(self.pool).await?;

        Ok(rows.into_iter().map(ManufacturerRow::from_tuple).collect())
    }

    /// Distinct manufacturer countries.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn countries(&self) -> StorageResult<Vec<String>> {
        let rows: Vec<(String,)> = query_as("SELECT DISTINCT Tara FROM Producator")
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(|(tara,)| tara).collect())
    }

    /// All manufacturers with a `Da`/`Nu` flag for having at least one
    /// associated drug.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn with_drug_flag(&self) -> StorageResult<Vec<ManufacturerWithDrugFlag>> {
        let rows: Vec<(
            i32,
            String,
            String,
            Option<String>,
            Option<String>,
            Option<String>,
            String,
        )> = query_as(
            r#"
            SELECT
                P.IDProducator,
                P.Nume,
                P.Tara,
                P.Mail,
                P.Telefon,
                P.AdresaSediu,
                CASE
                    WHEN EXISTS (
                        SELECT 1
                        FROM Medicamente M
                        WHERE M.IDProducator = P.IDProducator
                    ) THEN 'Da'
                    ELSE 'Nu'
                END AS MedicamenteAsociate
            FROM Producator P
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ManufacturerWithDrugFlag {
                manufacturer: ManufacturerRow::from_tuple((
                    row.0, row.1, row.2, row.3, row.4, row.5,
                )),
                medicamente_asociate: row.6,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_direction_parses_case_insensitively() {
        assert_eq!("asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert_eq!("Asc".parse::<SortDirection>(), Ok(SortDirection::Asc));
        assert!("ascending".parse::<SortDirection>().is_err());
        assert!("; DROP TABLE Producator".parse::<SortDirection>().is_err());
    }

    #[test]
    fn drug_flag_flattens_into_manufacturer_object() {
        let with_flag = ManufacturerWithDrugFlag {
            manufacturer: ManufacturerRow::from_tuple((
                7,
                "Terapia".into(),
                "Romania".into(),
                None,
                None,
                None,
            )),
            medicamente_asociate: "Da".into(),
        };
        let json = serde_json::to_value(&with_flag).unwrap();
        assert_eq!(json["IDProducator"], 7);
        assert_eq!(json["Tara"], "Romania");
        assert_eq!(json["MedicamenteAsociate"], "Da");
    }
}
