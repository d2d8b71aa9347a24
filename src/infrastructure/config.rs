use crate::domain::models::{ReminderPolicy, ReservationType};
use crate::infrastructure::error::InfraError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const APP_JSON: &str = "app.json";
const REMINDERS_JSON: &str = "reminders.json";

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub schema: u8,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigBundle {
    pub app: serde_json::Value,
    pub reminders: serde_json::Value,
}

fn default_files() -> HashMap<&'static str, serde_json::Value> {
    HashMap::from([
        (
            APP_JSON,
            serde_json::json!({
                "schema": 1,
                "appName": "Wayfare",
                "timezone": "UTC"
            }),
        ),
        (
            REMINDERS_JSON,
            serde_json::json!({
                "schema": 1,
                "leadMinutes": {
                    "flight": [1440, 180],
                    "hotel": [1440],
                    "car": [180],
                    "train": [180],
                    "meeting": [60],
                    "event": [60]
                }
            }),
        ),
    ])
}

pub fn ensure_default_configs(config_dir: &Path) -> Result<(), InfraError> {
    for (name, value) in default_files() {
        let path = config_dir.join(name);
        if !path.exists() {
            let formatted = serde_json::to_string_pretty(&value)?;
            fs::write(path, format!("{formatted}\n"))?;
        }
    }
    Ok(())
}

fn read_config(path: &Path) -> Result<serde_json::Value, InfraError> {
    let raw = fs::read_to_string(path)?;
    let parsed: serde_json::Value = serde_json::from_str(&raw)?;
    let schema = parsed
        .get("schema")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| InfraError::InvalidConfig(format!("missing schema in {}", path.display())))?;
    if schema != 1 {
        return Err(InfraError::InvalidConfig(format!(
            "unsupported schema {} in {}",
            schema,
            path.display()
        )));
    }
    Ok(parsed)
}

pub fn load_configs(config_dir: &Path) -> Result<ConfigBundle, InfraError> {
    Ok(ConfigBundle {
        app: read_config(&config_dir.join(APP_JSON))?,
        reminders: read_config(&config_dir.join(REMINDERS_JSON))?,
    })
}

pub fn read_timezone(config_dir: &Path) -> Result<Option<String>, InfraError> {
    let app = read_config(&config_dir.join(APP_JSON))?;
    Ok(app
        .get("timezone")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned))
}

/// Reminder lead times from `reminders.json`. Types absent from the file
/// keep their shipped defaults.
pub fn read_reminder_policy(config_dir: &Path) -> Result<ReminderPolicy, InfraError> {
    let reminders = read_config(&config_dir.join(REMINDERS_JSON))?;
    let policy = parse_reminder_policy(&reminders);
    policy
        .validate()
        .map_err(InfraError::InvalidConfig)?;
    Ok(policy)
}

fn parse_reminder_policy(value: &serde_json::Value) -> ReminderPolicy {
    let mut policy = ReminderPolicy::default();
    let Some(lead_minutes) = value.get("leadMinutes").and_then(serde_json::Value::as_object)
    else {
        return policy;
    };

    for (key, reservation_type) in [
        ("flight", ReservationType::Flight),
        ("hotel", ReservationType::Hotel),
        ("car", ReservationType::Car),
        ("train", ReservationType::Train),
        ("meeting", ReservationType::Meeting),
        ("event", ReservationType::Event),
    ] {
        let Some(entries) = lead_minutes.get(key).and_then(serde_json::Value::as_array) else {
            continue;
        };
        let parsed: Vec<i64> = entries
            .iter()
            .filter_map(serde_json::Value::as_i64)
            .collect();
        match reservation_type {
            ReservationType::Flight => policy.flight_lead_minutes = parsed,
            ReservationType::Hotel => policy.hotel_lead_minutes = parsed,
            ReservationType::Car => policy.car_lead_minutes = parsed,
            ReservationType::Train => policy.train_lead_minutes = parsed,
            ReservationType::Meeting => policy.meeting_lead_minutes = parsed,
            ReservationType::Event => policy.event_lead_minutes = parsed,
        }
    }
    policy
}
