use serde::{Deserialize, Deserializer, Serialize};

use super::PatternCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamConfig {
    #[serde(rename = "streamId", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "streamName")]
    pub name: String,
    pub url: String,
    #[serde(rename = "type", default)]
    pub category: PatternCategory,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl StreamConfig {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        url: impl Into<String>,
        category: PatternCategory,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            category,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    #[serde(rename = "machineId", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(rename = "machineName")]
    pub name: String,
    #[serde(default)]
    pub streams: Vec<StreamConfig>,
}

impl MachineConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>, streams: Vec<StreamConfig>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            streams,
        }
    }

    pub fn find_stream(&self, stream_id: &str) -> Option<&StreamConfig> {
        self.streams.iter().find(|s| s.id == stream_id)
    }
}

/// Top-level shape of the machines file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fleet {
    pub machines: Vec<MachineConfig>,
}

impl Fleet {
    pub fn new(machines: Vec<MachineConfig>) -> Self {
        Self { machines }
    }

    pub fn find_machine(&self, machine_id: &str) -> Option<&MachineConfig> {
        self.machines.iter().find(|m| m.id == machine_id)
    }

    pub fn stream_count(&self) -> usize {
        self.machines.iter().map(|m| m.streams.len()).sum()
    }

    pub fn validate(&self) -> Result<(), String> {
        for machine in &self.machines {
            if machine.id.trim().is_empty() {
                return Err(format!("Machine '{}' has an empty id", machine.name));
            }
            for stream in &machine.streams {
                if stream.enabled && stream.url.trim().is_empty() {
                    return Err(format!(
                        "Stream {} on machine {} is enabled but has no url",
                        stream.id, machine.id
                    ));
                }
            }
        }
        Ok(())
    }
}

fn enabled_by_default() -> bool {
    true
}

// Ids show up both as `1` and `"1"` in hand-written machine files.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, found {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn machines_file_accepts_numeric_ids_and_defaults() {
        let fleet: Fleet = serde_json::from_str(
            r#"{
                "machines": [
                    {
                        "machineId": 1,
                        "machineName": "Encoder A",
                        "streams": [
                            { "streamId": 10, "streamName": "News", "url": "http://a/1", "type": "usb" },
                            { "streamId": "11", "streamName": "Sport", "url": "http://a/2", "enabled": false }
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();

        let machine = fleet.find_machine("1").unwrap();
        assert_eq!(machine.name, "Encoder A");
        assert_eq!(machine.streams[0].id, "10");
        assert_eq!(machine.streams[0].category, PatternCategory::Usb);
        assert!(machine.streams[0].enabled);
        assert_eq!(machine.streams[1].category, PatternCategory::Rectangle);
        assert!(!machine.find_stream("11").unwrap().enabled);
        assert_eq!(fleet.stream_count(), 2);
    }

    #[test]
    fn enabled_stream_without_url_is_invalid() {
        let fleet = Fleet::new(vec![MachineConfig::new(
            "m1",
            "Machine",
            vec![StreamConfig::new("s1", "Stream", " ", PatternCategory::Rectangle)],
        )]);
        assert!(fleet.validate().is_err());

        let fleet = Fleet::new(vec![MachineConfig::new(
            "m1",
            "Machine",
            vec![StreamConfig::new("s1", "Stream", "", PatternCategory::Rectangle).disabled()],
        )]);
        assert!(fleet.validate().is_ok());
    }
}
