use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub templates_dir: PathBuf,
    pub outbox_dir: PathBuf,
    pub exports_dir: PathBuf,
    pub forms_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            data_dir: dir_from_env("CLINIC_DATA_DIR", "data"),
            templates_dir: dir_from_env("CLINIC_TEMPLATES_DIR", "templates"),
            outbox_dir: dir_from_env("CLINIC_OUTBOX_DIR", "outbox"),
            exports_dir: dir_from_env("CLINIC_EXPORTS_DIR", "exports"),
            forms_dir: dir_from_env("CLINIC_FORMS_DIR", "forms"),
        }
    }

    /// Create the writable directories if they are missing.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        for dir in [&self.data_dir, &self.outbox_dir, &self.exports_dir] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn schedule_path(&self) -> PathBuf {
        self.data_dir.join("doctor_schedule.csv")
    }

    pub fn patients_path(&self) -> PathBuf {
        self.data_dir.join("patients.csv")
    }

    pub fn appointments_path(&self) -> PathBuf {
        self.data_dir.join("appointments.csv")
    }

    pub fn reminders_path(&self) -> PathBuf {
        self.data_dir.join("reminders.csv")
    }

    pub fn intake_form_path(&self) -> PathBuf {
        self.forms_dir.join("New Patient Intake Form.pdf")
    }
}

fn dir_from_env(var: &str, default: &str) -> PathBuf {
    env::var(var)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            warn!("{} not set, using default '{}'", var, default);
            PathBuf::from(default)
        })
}
