use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use shared_store::CsvTable;

use crate::models::{Patient, PatientError, PatientMatch, PatientType};

/// The patient roster backed by `patients.csv`.
pub struct PatientDirectory {
    table: CsvTable<Patient>,
}

impl PatientDirectory {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PatientError> {
        let table = CsvTable::open(path.as_ref().to_path_buf())?;
        Ok(Self { table })
    }

    /// Greeting lookup: case-insensitive on names, exact on date of birth.
    /// A miss means a new patient, not an error.
    pub async fn match_patient(
        &self,
        first_name: &str,
        last_name: &str,
        dob: NaiveDate,
    ) -> PatientMatch {
        let found = self
            .table
            .snapshot()
            .await
            .into_iter()
            .find(|p| {
                p.first_name.eq_ignore_ascii_case(first_name)
                    && p.last_name.eq_ignore_ascii_case(last_name)
                    && p.dob == dob
            });

        match found {
            Some(patient) => {
                debug!("Matched returning patient {}", patient.patient_id);
                PatientMatch {
                    patient_type: PatientType::Returning,
                    patient: Some(patient),
                }
            }
            None => PatientMatch {
                patient_type: PatientType::New,
                patient: None,
            },
        }
    }

    /// Create a record for a first-time patient, returning it with its fresh
    /// `P`-prefixed id.
    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        dob: NaiveDate,
        email: &str,
    ) -> Result<Patient, PatientError> {
        let short = Uuid::new_v4().simple().to_string()[..4].to_uppercase();
        let patient = Patient {
            patient_id: format!("P{}", short),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            dob,
            email: email.to_string(),
        };
        self.table.append(vec![patient.clone()]).await?;
        info!("Registered new patient {}", patient.patient_id);
        Ok(patient)
    }

    pub async fn all_patients(&self) -> Vec<Patient> {
        self.table.snapshot().await
    }
}
