//! Declarative route configuration.
//!
//! # Data Flow
//! ```text
//! routes file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RoutesConfig (validated)
//!     → RoutesConfig::apply(&registrar)
//!         → registrar.add / add_static / add_template / add_error
//! ```
//!
//! # Design Decisions
//! - Views are referenced by dotted path only, so a routes file never forces
//!   its view modules to exist before first traffic
//! - Validation is separated from parsing and reports every violation
//! - Application goes through the public registrar API, nothing is special

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_routes, parse_routes, ConfigError};
pub use schema::{ErrorEntry, RouteEntry, RoutesConfig, StaticEntry, TemplateEntry};
pub use validation::ValidationError;
