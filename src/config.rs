use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

/// One supervised listener: host identifier and the shell command whose
/// stdout carries the receiver line protocol.
#[derive(Debug, Clone)]
pub struct ListenerSpec {
    pub host: String,
    pub command: String,
}

/// InfluxDB connection parameters, one entry of the credential file.
#[derive(Debug, Clone, Deserialize)]
pub struct InfluxParams {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    #[serde(rename = "DBName")]
    pub db_name: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid yaml in \"{path}\": {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid json in \"{path}\": {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no database entry \"{db_id}\" in \"{path}\"")]
    UnknownDatabase { db_id: String, path: String },

    #[error("no listeners configured in \"{path}\"")]
    NoListeners { path: String },
}

/// YAML layout of the main configuration file.
#[derive(Debug, Deserialize)]
struct FileConfig {
    listeners: BTreeMap<String, String>,
    influx_db: InfluxDbSection,
}

#[derive(Debug, Deserialize)]
struct InfluxDbSection {
    database_config_file: String,
    db_id: String,
}

/// Fully resolved runtime configuration.
#[derive(Debug)]
pub struct Config {
    pub listeners: Vec<ListenerSpec>,
    pub influx: InfluxParams,
}

impl Config {
    /// Loads the YAML listener file, then the JSON credential file it
    /// points to, and resolves the selected database entry.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;

        let file: FileConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
                path: path.to_string(),
                source,
            })?;

        if file.listeners.is_empty() {
            return Err(ConfigError::NoListeners {
                path: path.to_string(),
            });
        }

        // relative credential paths resolve against the config file
        let db_path = resolve_sibling(path, &file.influx_db.database_config_file);
        let influx = load_influx_params(&db_path, &file.influx_db.db_id)?;

        let listeners = file
            .listeners
            .into_iter()
            .map(|(host, command)| ListenerSpec { host, command })
            .collect();

        Ok(Self { listeners, influx })
    }
}

fn load_influx_params(path: &str, db_id: &str) -> Result<InfluxParams, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;

    let mut entries: BTreeMap<String, InfluxParams> =
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_string(),
            source,
        })?;

    entries
        .remove(db_id)
        .ok_or_else(|| ConfigError::UnknownDatabase {
            db_id: db_id.to_string(),
            path: path.to_string(),
        })
}

fn resolve_sibling(config_path: &str, target: &str) -> String {
    let target_path = Path::new(target);

    if target_path.is_absolute() {
        return target.to_string();
    }

    match Path::new(config_path).parent() {
        Some(parent) if parent != Path::new("") => {
            parent.join(target_path).to_string_lossy().into_owned()
        },
        _ => target.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::TempDir;

    const DB_JSON: &str = r#"{
        "production": {
            "host": "influx.example.org",
            "port": 8086,
            "user": "writer",
            "pass": "secret",
            "DBName": "gnss"
        }
    }"#;

    fn write_files(dir: &TempDir, yaml: &str) -> String {
        let db_path = dir.path().join("db.json");
        let mut fd = fs::File::create(&db_path).unwrap();
        fd.write_all(DB_JSON.as_bytes()).unwrap();

        let config_path = dir.path().join("config.yaml");
        let mut fd = fs::File::create(&config_path).unwrap();
        fd.write_all(yaml.as_bytes()).unwrap();

        config_path.to_string_lossy().into_owned()
    }

    const CONFIG_YAML: &str = r#"
listeners:
  site-a: "eryo_listener --host 10.0.0.1"
  site-b: "eryo_listener --host 10.0.0.2"
influx_db:
  database_config_file: db.json
  db_id: production
"#;

    #[test]
    fn loads_listeners_and_credentials() {
        let dir = TempDir::new().unwrap();
        let path = write_files(&dir, CONFIG_YAML);

        let config = Config::load(&path).unwrap();

        assert_eq!(config.listeners.len(), 2);
        assert_eq!(config.listeners[0].host, "site-a");
        assert_eq!(config.listeners[0].command, "eryo_listener --host 10.0.0.1");

        assert_eq!(config.influx.host, "influx.example.org");
        assert_eq!(config.influx.port, 8086);
        assert_eq!(config.influx.db_name, "gnss");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load("/nonexistent/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn unknown_db_id_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_files(
            &dir,
            r#"
listeners:
  site-a: "true"
influx_db:
  database_config_file: db.json
  db_id: staging
"#,
        );

        let err = Config::load(&path).unwrap_err();
        match err {
            ConfigError::UnknownDatabase { db_id, .. } => assert_eq!(db_id, "staging"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn empty_listener_set_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_files(
            &dir,
            r#"
listeners: {}
influx_db:
  database_config_file: db.json
  db_id: production
"#,
        );

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::NoListeners { .. }));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write_files(&dir, "listeners: [unclosed");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }
}
