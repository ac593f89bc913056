//! Service definitions loaded from the YAML registry file.
//!
//! The engine treats the registry as read-only input: each service names the
//! locations whose territories get computed. Editing the file does not
//! trigger recomputation by itself; the fingerprint check picks the change
//! up on the next scheduled or manual run.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::types::Location;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub locations: Vec<Location>,
}

impl ServiceConfig {
    /// URL-safe slug derived from the service name, used as the cache key.
    #[must_use]
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Locations that participate in the partition.
    #[must_use]
    pub fn mappable_locations(&self) -> Vec<Location> {
        self.locations
            .iter()
            .filter(|l| l.is_mappable())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct ServicesFile {
    pub services: Vec<ServiceConfig>,
}

/// Load and validate the services registry from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation (empty names, duplicate slugs, duplicate location IDs within
/// one service).
pub fn load_services(path: &Path) -> Result<ServicesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ServicesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let services_file: ServicesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::ServicesFileParse)?;

    validate_services(&services_file)?;

    Ok(services_file)
}

fn validate_services(services_file: &ServicesFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for service in &services_file.services {
        if service.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "service name must be non-empty".to_string(),
            ));
        }

        let slug = service.slug();
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate service slug: '{}' (from service '{}')",
                slug, service.name
            )));
        }

        let mut seen_ids = HashSet::new();
        for location in &service.locations {
            if location.id.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "service '{}' has a location with an empty id",
                    service.name
                )));
            }
            if !seen_ids.insert(location.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "service '{}' has duplicate location id '{}'",
                    service.name, location.id
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(id: &str, lat: Option<f64>, lng: Option<f64>) -> Location {
        Location {
            id: id.to_string(),
            name: id.to_uppercase(),
            address: None,
            latitude: lat,
            longitude: lng,
            fallback: false,
        }
    }

    #[test]
    fn slug_simple_name() {
        let service = ServiceConfig {
            name: "Notdienst Schlüssel".to_string(),
            locations: vec![],
        };
        // non-ASCII chars are stripped
        assert_eq!(service.slug(), "notdienst-schlssel");
    }

    #[test]
    fn mappable_locations_filters_coordinates_and_fallbacks() {
        let mut fallback = location("c", Some(49.0), Some(9.0));
        fallback.fallback = true;
        let service = ServiceConfig {
            name: "Towing".to_string(),
            locations: vec![
                location("a", Some(47.7), Some(10.3)),
                location("b", None, Some(10.3)),
                fallback,
            ],
        };
        let mappable = service.mappable_locations();
        assert_eq!(mappable.len(), 1);
        assert_eq!(mappable[0].id, "a");
    }

    #[test]
    fn validate_rejects_duplicate_location_ids() {
        let services_file = ServicesFile {
            services: vec![ServiceConfig {
                name: "Towing".to_string(),
                locations: vec![
                    location("a", Some(47.7), Some(10.3)),
                    location("a", Some(48.1), Some(11.5)),
                ],
            }],
        };
        let err = validate_services(&services_file).unwrap_err();
        assert!(err.to_string().contains("duplicate location id"));
    }

    #[test]
    fn validate_rejects_duplicate_service_slugs() {
        let services_file = ServicesFile {
            services: vec![
                ServiceConfig {
                    name: "Key Service".to_string(),
                    locations: vec![],
                },
                ServiceConfig {
                    name: "Key--Service".to_string(),
                    locations: vec![],
                },
            ],
        };
        let err = validate_services(&services_file).unwrap_err();
        assert!(err.to_string().contains("duplicate service slug"));
    }

    #[test]
    fn validate_rejects_empty_name() {
        let services_file = ServicesFile {
            services: vec![ServiceConfig {
                name: "  ".to_string(),
                locations: vec![],
            }],
        };
        assert!(validate_services(&services_file).is_err());
    }

    #[test]
    fn parses_yaml_registry() {
        let yaml = r"
services:
  - name: Towing
    locations:
      - id: kempten
        name: Kempten Depot
        latitude: 47.7261
        longitude: 10.3145
      - id: overflow
        name: Overflow Partner
        fallback: true
";
        let parsed: ServicesFile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.services.len(), 1);
        assert_eq!(parsed.services[0].locations.len(), 2);
        assert!(parsed.services[0].locations[1].fallback);
        assert!(validate_services(&parsed).is_ok());
    }
}
