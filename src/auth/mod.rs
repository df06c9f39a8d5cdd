//! Login and signup flow

mod form;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::clock::{Clock, SystemClock};
use crate::error::{PawcareError, Result};
use crate::models::{NewActivity, NewPet, Profile};
use crate::navigation::{Navigator, Route};

pub use form::*;

/// What a call to [`AuthController::submit`] ended with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The form did not validate; the backend was not called
    Invalid,
    LoggedIn,
    /// Account, profile, pet and first activity were all written
    SignedUp,
    /// A backend call failed; see [`AuthController::error_message`]
    Failed,
}

/// Drives the auth form: validation, submission and the writes that follow
/// a signup.
pub struct AuthController {
    backend: Arc<dyn Backend>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
    form: AuthForm,
    error_message: Option<String>,
    loading: Arc<watch::Sender<bool>>,
    account_created: bool,
}

/// Clears the loading flag when a submit ends, however it ends
struct LoadingGuard(Arc<watch::Sender<bool>>);

impl LoadingGuard {
    fn start(flag: &Arc<watch::Sender<bool>>) -> Self {
        flag.send_replace(true);
        Self(flag.clone())
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

impl AuthController {
    /// Starts in login mode with an empty form
    pub fn new(backend: Arc<dyn Backend>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            backend,
            navigator,
            clock: Arc::new(SystemClock),
            form: AuthForm::new(AuthMode::Login),
            error_message: None,
            loading: Arc::new(watch::channel(false).0),
            account_created: false,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn mode(&self) -> AuthMode {
        self.form.mode()
    }

    pub fn is_login(&self) -> bool {
        self.mode() == AuthMode::Login
    }

    pub fn form(&self) -> &AuthForm {
        &self.form
    }

    pub fn set_value(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
    }

    pub fn is_valid(&self) -> bool {
        self.form.is_valid()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Follows the loading flag while a submit is in flight
    pub fn loading_updates(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Whether a sign-up call has succeeded, even if the writes after it failed
    pub fn account_created(&self) -> bool {
        self.account_created
    }

    /// Switch between login and signup, clearing every field and the last error
    pub fn toggle_form(&mut self) {
        self.form.toggle();
        self.error_message = None;
    }

    /// Submit the form.
    ///
    /// An invalid form is never sent. On success the navigator is sent to the
    /// dashboard; on failure the error message is stored and navigation does
    /// not happen. Writes completed before a failure are not undone.
    pub async fn submit(&mut self) -> SubmitOutcome {
        let _loading = LoadingGuard::start(&self.loading);
        self.error_message = None;

        self.run_submit().await
    }

    async fn run_submit(&mut self) -> SubmitOutcome {
        if !self.form.is_valid() {
            return SubmitOutcome::Invalid;
        }

        let result = match self.form.mode() {
            AuthMode::Login => self.login().await.map(|_| SubmitOutcome::LoggedIn),
            AuthMode::Signup => self.signup().await.map(|_| SubmitOutcome::SignedUp),
        };

        match result {
            Ok(outcome) => {
                self.navigator.navigate(Route::Dashboard);
                outcome
            }
            Err(err) => {
                warn!(mode = ?self.form.mode(), error = %err, "auth submit failed");
                self.error_message = Some(err.user_message());
                SubmitOutcome::Failed
            }
        }
    }

    async fn login(&self) -> Result<()> {
        let values = self.form.values();
        let user = self
            .backend
            .sign_in_with_password(&values.email, &values.password)
            .await?;
        info!(user_id = %user.id, "signed in");
        Ok(())
    }

    async fn signup(&mut self) -> Result<()> {
        let values = self.form.values().clone();
        let pet_year: i32 = values
            .pet_year
            .trim()
            .parse()
            .map_err(|_| PawcareError::InvalidInput(format!("pet year {:?}", values.pet_year)))?;

        let user = self.backend.sign_up(&values.email, &values.password).await?;
        self.account_created = true;
        info!(user_id = %user.id, "account created");

        let profile = Profile {
            id: user.id.clone(),
            name: values.name.clone(),
            email: values.email.clone(),
        };
        self.backend.insert_profile(&profile).await?;

        let today = self.clock.today();
        let pet = NewPet::new(
            &user.id,
            &values.pet_name,
            &values.pet_breed,
            pet_year,
            self.clock.current_year(),
        );
        self.backend.insert_pet(&pet).await?;

        let activity = NewActivity::account_created(&user.id, today);
        self.backend.insert_activity(&activity).await?;

        info!(user_id = %user.id, pet = %pet.name, "signup records written");
        Ok(())
    }
}
