use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_json::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    if config.max_upload_bytes == 0 {
        return Err(ConfigError::Validation {
            message: "maxUploadBytes must be greater than zero".to_string(),
        });
    }

    if config.read_chunk_bytes == 0 {
        return Err(ConfigError::Validation {
            message: "readChunkBytes must be greater than zero".to_string(),
        });
    }

    if config.read_chunk_bytes as u64 > config.max_upload_bytes {
        return Err(ConfigError::Validation {
            message: format!(
                "readChunkBytes ({}) exceeds maxUploadBytes ({})",
                config.read_chunk_bytes, config.max_upload_bytes
            ),
        });
    }

    if config.delimiter == '\n' || config.delimiter == '\r' {
        return Err(ConfigError::Validation {
            message: "delimiter must not be a line break".to_string(),
        });
    }

    if config.event_capacity == 0 {
        return Err(ConfigError::Validation {
            message: "eventCapacity must be greater than zero".to_string(),
        });
    }

    for (name, range) in [
        ("metrics", &config.ranges.metrics),
        ("consensus", &config.ranges.consensus),
    ] {
        if !range.is_ordered() {
            return Err(ConfigError::Validation {
                message: format!("Range '{}' ends before it starts: {}", name, range),
            });
        }
    }

    if config.companies.is_empty() {
        return Err(ConfigError::Validation {
            message: "companies must list at least one entry".to_string(),
        });
    }

    let mut seen = std::collections::HashSet::new();
    for company in &config.companies {
        if company.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "company names must not be blank".to_string(),
            });
        }
        if !seen.insert(company.to_lowercase()) {
            return Err(ConfigError::Validation {
                message: format!("Duplicate company: {}", company),
            });
        }
    }

    Ok(())
}
