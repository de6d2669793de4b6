use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{Duration, NaiveDateTime};

const ICS_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Write a minimal VCALENDAR file for a confirmed appointment into the
/// exports directory and return its path.
pub fn create_ics_for_appointment(
    exports_dir: &Path,
    appointment_id: &str,
    doctor_name: &str,
    start: NaiveDateTime,
    duration_minutes: i64,
    location: &str,
) -> Result<PathBuf> {
    let end = start + Duration::minutes(duration_minutes);
    let ics = format!(
        "BEGIN:VCALENDAR\r\n\
         VERSION:2.0\r\n\
         PRODID:-//Clinic//Scheduling Agent//EN\r\n\
         BEGIN:VEVENT\r\n\
         UID:{uid}\r\n\
         DTSTAMP:{start}\r\n\
         DTSTART:{start}\r\n\
         DTEND:{end}\r\n\
         SUMMARY:Clinic Appointment with {doctor}\r\n\
         LOCATION:{location}\r\n\
         END:VEVENT\r\n\
         END:VCALENDAR\r\n",
        uid = appointment_id,
        start = start.format(ICS_TIME_FORMAT),
        end = end.format(ICS_TIME_FORMAT),
        doctor = doctor_name,
        location = location,
    );

    fs::create_dir_all(exports_dir)?;
    let path = exports_dir.join(format!("appointment_{}.ics", appointment_id));
    fs::write(&path, ics)?;
    Ok(path)
}
