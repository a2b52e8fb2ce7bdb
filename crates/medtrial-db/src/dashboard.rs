//! Dashboard report queries.

use serde::Serialize;
use sqlx_core::query_as::query_as;

use crate::error::StorageResult;
use crate::PgPool;

/// Row counts across the main tables, computed in one statement.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    #[serde(rename = "TotalPacienti")]
    pub total_pacienti: i64,
    #[serde(rename = "TotalMedici")]
    pub total_medici: i64,
    #[serde(rename = "TotalCabinete")]
    pub total_cabinete: i64,
    #[serde(rename = "TotalMedicamente")]
    pub total_medicamente: i64,
    #[serde(rename = "TotalProducatori")]
    pub total_producatori: i64,
}

/// A doctor ranked by the number of distinct roles held.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TopDoctor {
    #[serde(rename = "Nume")]
    pub nume: String,
    #[serde(rename = "Prenume")]
    pub prenume: String,
    #[serde(rename = "NumarRoluri")]
    pub numar_roluri: i64,
}

/// Dashboard storage operations.
pub struct DashboardStorage<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardStorage<'a> {
    /// Creates a new dashboard storage with a connection pool reference.
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Row counts for the dashboard header.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn stats(&self) -> StorageResult<DashboardStats> {
        let row: (i64, i64, i64, i64, i64) = query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM Pacienti) AS TotalPacienti,
                (SELECT COUNT(*) FROM Medic) AS TotalMedici,
                (SELECT COUNT(*) FROM CabinetTestare) AS TotalCabinete,
                (SELECT COUNT(*) FROM Medicamente) AS TotalMedicamente,
                (SELECT COUNT(*) FROM Producator) AS TotalProducatori
            "#,
        )
        .fetch_one(self.pool)
        .await?;

        Ok(DashboardStats {
            total_pacienti: row.0,
            total_medici: row.1,
            total_cabinete: row.2,
            total_medicamente: row.3,
            total_producatori: row.4,
        })
    }

    /// Top five doctors by number of distinct roles across clinics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn top_doctors(&self) -> StorageResult<Vec<TopDoctor>> {
        let rows: Vec<(String, String, i64)> = query_as(
            r#"
            SELECT
                m.Nume,
                m.Prenume,
                COUNT(DISTINCT mc.Rol_medic) AS NumarRoluri
            FROM Medic m
            INNER JOIN MedicCabinete mc ON m.IDMedic = mc.IDMedic
            GROUP BY m.Nume, m.Prenume
            ORDER BY NumarRoluri DESC
            LIMIT 5
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopDoctor {
                nume: row.0,
                prenume: row.1,
                numar_roluri: row.2,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_serialize_with_api_field_names() {
        let stats = DashboardStats {
            total_pacienti: 10,
            total_medici: 4,
            total_cabinete: 2,
            total_medicamente: 7,
            total_producatori: 3,
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["TotalPacienti"], 10);
        assert_eq!(json["TotalProducatori"], 3);
    }
}
