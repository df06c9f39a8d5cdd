//! Dashboard view model and the loaders that fill it

mod present;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::Result;
use crate::models::{Activity, Pet, SessionUser};
use crate::navigation::{Navigator, Route};

pub use present::*;

/// Name shown until a profile has been loaded
pub const DEFAULT_USER_NAME: &str = "User";

/// How many activities the dashboard lists
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// What the dashboard renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub user_name: String,
    pub pets: Vec<Pet>,
    pub activities: Vec<Activity>,
    pub sidebar_collapsed: bool,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            user_name: DEFAULT_USER_NAME.to_string(),
            pets: Vec::new(),
            activities: Vec::new(),
            sidebar_collapsed: false,
        }
    }
}

pub struct DashboardLoader {
    backend: Arc<dyn Backend>,
    navigator: Arc<dyn Navigator>,
    view: DashboardView,
}

impl DashboardLoader {
    pub fn new(backend: Arc<dyn Backend>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            backend,
            navigator,
            view: DashboardView::default(),
        }
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// Resolve the session user once, then run the three loaders in order.
    ///
    /// Returns the session user, or `None` when nobody is signed in, in which
    /// case the view keeps its defaults. A failing loader is logged and the
    /// remaining ones still run.
    pub async fn activate(&mut self) -> Option<SessionUser> {
        let user = match self.backend.current_user().await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!("no session user, dashboard left empty");
                return None;
            }
            Err(err) => {
                warn!(error = %err, "could not resolve session user");
                return None;
            }
        };

        if let Err(err) = self.load_user_data(&user.id).await {
            warn!(error = %err, "loading profile failed");
        }
        if let Err(err) = self.load_pets(&user.id).await {
            warn!(error = %err, "loading pets failed");
        }
        if let Err(err) = self.load_activities(&user.id).await {
            warn!(error = %err, "loading activities failed");
        }

        Some(user)
    }

    /// Set the display name from the user's profile; keep the current one when
    /// there is no profile.
    pub async fn load_user_data(&mut self, user_id: &str) -> Result<()> {
        if let Some(name) = self.backend.profile_name(user_id).await? {
            self.view.user_name = name;
        }
        Ok(())
    }

    pub async fn load_pets(&mut self, user_id: &str) -> Result<()> {
        self.view.pets = self.backend.pets_for_owner(user_id).await?;
        debug!(count = self.view.pets.len(), "pets loaded");
        Ok(())
    }

    pub async fn load_activities(&mut self, user_id: &str) -> Result<()> {
        self.view.activities = self
            .backend
            .recent_activities(user_id, RECENT_ACTIVITY_LIMIT)
            .await?;
        debug!(count = self.view.activities.len(), "activities loaded");
        Ok(())
    }

    /// Sign out and go to the landing page whether or not sign-out succeeded
    pub async fn logout(&mut self) {
        match self.backend.sign_out().await {
            Ok(()) => info!("signed out"),
            Err(err) => warn!(error = %err, "sign-out failed"),
        }
        self.navigator.navigate(Route::Home);
    }

    pub fn toggle_sidebar(&mut self) {
        self.view.sidebar_collapsed = !self.view.sidebar_collapsed;
    }

    pub fn navigate_to(&self, route: Route) {
        self.navigator.navigate(route);
    }
}
