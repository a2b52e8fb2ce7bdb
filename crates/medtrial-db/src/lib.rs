//! PostgreSQL storage layer for the medtrial server.
//!
//! One storage struct per entity, each borrowing the shared connection
//! pool and issuing exactly one parameterized statement per operation:
//!
//! - Patients (`Pacienti`)
//! - Doctors (`Medic`)
//! - Manufacturers (`Producator`)
//! - Drugs (`Medicamente`)
//! - Clinics (`CabinetTestare`)
//! - Doctor-clinic assignments (`MedicCabinete`)
//! - Clinical trials (`TestareClinica`)
//! - Trial results (`RezultatTestare`)
//! - Medical history (`IstoricMedical`)
//!
//! The schema is assumed pre-existing; this crate never creates or
//! migrates tables. Inserts and updates use `RETURNING` so the database
//! is the single source of truth for every row handed back to clients.

pub mod assignments;
pub mod clinics;
pub mod config;
pub mod dashboard;
pub mod doctors;
pub mod drugs;
pub mod error;
pub mod manufacturers;
pub mod medical_history;
pub mod patients;
pub mod pool;
pub mod trial_results;
pub mod trials;

use sqlx_core::pool::Pool;
use sqlx_postgres::Postgres;

/// PostgreSQL connection pool type alias.
pub type PgPool = Pool<Postgres>;

pub use assignments::AssignmentStorage;
pub use clinics::ClinicStorage;
pub use config::PostgresConfig;
pub use dashboard::DashboardStorage;
pub use doctors::DoctorStorage;
pub use drugs::DrugStorage;
pub use error::{StorageError, StorageResult};
pub use manufacturers::{ManufacturerStorage, SortDirection};
pub use medical_history::MedicalHistoryStorage;
pub use patients::PatientStorage;
pub use pool::create_pool;
pub use trial_results::TrialResultStorage;
pub use trials::TrialStorage;
