//! Semantic validation of routes files.

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::schema::RoutesConfig;

/// Methods a route entry may name; extension methods are not routable.
const KNOWN_METHODS: &[&str] = &[
    "GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS", "TRACE",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("pattern {0:?} must start with '/'")]
    PatternNotRooted(String),

    #[error("route {pattern:?} has an empty view path")]
    EmptyViewPath { pattern: String },

    #[error("route {pattern:?} names unknown HTTP method {method:?}")]
    UnknownMethod { pattern: String, method: String },

    #[error("error handler status {0} is not a valid HTTP status code")]
    InvalidStatus(u16),

    #[error("static route {0:?} has neither a filename nor a {{*filename}} capture")]
    StaticWithoutFilename(String),

    #[error("template route {pattern:?} has an empty template name")]
    EmptyTemplate { pattern: String },
}

/// Check everything, collecting all violations instead of stopping at the
/// first one.
pub fn validate_config(config: &RoutesConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for route in &config.routes {
        check_pattern(&route.pattern, &mut errors);
        if route.view.trim().is_empty() {
            errors.push(ValidationError::EmptyViewPath {
                pattern: route.pattern.clone(),
            });
        }
        for method in &route.methods {
            if !KNOWN_METHODS.contains(&method.to_uppercase().as_str()) {
                errors.push(ValidationError::UnknownMethod {
                    pattern: route.pattern.clone(),
                    method: method.clone(),
                });
            }
        }
    }

    for entry in &config.static_routes {
        check_pattern(&entry.pattern, &mut errors);
        if entry.filename.is_none() && !entry.pattern.contains("{*filename}") {
            errors.push(ValidationError::StaticWithoutFilename(entry.pattern.clone()));
        }
    }

    for entry in &config.template_routes {
        check_pattern(&entry.pattern, &mut errors);
        if entry.template.trim().is_empty() {
            errors.push(ValidationError::EmptyTemplate {
                pattern: entry.pattern.clone(),
            });
        }
    }

    for entry in &config.error_handlers {
        if StatusCode::from_u16(entry.status).is_err() {
            errors.push(ValidationError::InvalidStatus(entry.status));
        }
        if entry.view.trim().is_empty() {
            errors.push(ValidationError::EmptyViewPath {
                pattern: format!("error {}", entry.status),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_pattern(pattern: &str, errors: &mut Vec<ValidationError>) {
    if !pattern.starts_with('/') {
        errors.push(ValidationError::PatternNotRooted(pattern.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{ErrorEntry, RouteEntry, StaticEntry};

    #[test]
    fn test_collects_every_violation() {
        let config = RoutesConfig {
            routes: vec![RouteEntry {
                pattern: "no-slash".into(),
                view: "".into(),
                methods: vec!["FETCH".into()],
                endpoint: None,
            }],
            static_routes: vec![StaticEntry {
                pattern: "/s".into(),
                filename: None,
                endpoint: None,
            }],
            error_handlers: vec![ErrorEntry {
                status: 99,
                view: "views.error".into(),
                app: false,
            }],
            ..Default::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn test_valid_config_passes() {
        let config = RoutesConfig {
            routes: vec![RouteEntry {
                pattern: "/".into(),
                view: "views.home".into(),
                methods: vec!["get".into(), "POST".into()],
                endpoint: Some("home".into()),
            }],
            static_routes: vec![StaticEntry {
                pattern: "/static/{*filename}".into(),
                filename: None,
                endpoint: None,
            }],
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }
}
