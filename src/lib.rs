//! PawCare client library
//!
//! The login / signup flow and the dashboard of a small pet-care app, backed
//! by a Supabase project. Both flows talk to the service only through the
//! [`Backend`](backend::Backend) trait and move between screens through a
//! [`Navigator`](navigation::Navigator), so a view layer (or a test) can
//! drive them directly.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pawcare::prelude::*;
//!
//! # async fn run() -> pawcare::error::Result<()> {
//! let config = AppConfig::new("https://your-project.supabase.co", "your-anon-key")?;
//! let backend = Arc::new(SupabaseBackend::new(config)?);
//! let navigator = Arc::new(RouteHistory::default());
//!
//! let mut auth = AuthController::new(backend.clone(), navigator.clone());
//! auth.set_value(Field::Email, "user@test.com");
//! auth.set_value(Field::Password, "secret1");
//!
//! if auth.submit().await == SubmitOutcome::LoggedIn {
//!     let mut dashboard = DashboardLoader::new(backend, navigator);
//!     dashboard.activate().await;
//!     println!("Hello, {}", dashboard.view().user_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod backend;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod navigation;

/// A convenience module for common imports
pub mod prelude {
    pub use crate::auth::{AuthController, AuthMode, Field, SubmitOutcome};
    pub use crate::backend::{Backend, SupabaseBackend};
    pub use crate::config::{AppConfig, ClientOptions};
    pub use crate::dashboard::{format_date, vaccination_icon, DashboardLoader, DashboardView};
    pub use crate::error::PawcareError;
    pub use crate::navigation::{Navigator, Route, RouteHistory};
}
