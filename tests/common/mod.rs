// In-memory Backend that records every call

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use pawcare::backend::Backend;
use pawcare::error::{PawcareError, Result};
use pawcare::models::{Activity, NewActivity, NewPet, Pet, Profile, SessionUser};
use pawcare_auth::AuthError;
use pawcare_postgrest::{PostgrestApiErrorDetails, PostgrestError};
use reqwest::StatusCode;
use tokio::sync::watch;

pub const USER_ID: &str = "user-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    SignIn,
    SignUp,
    SignOut,
    CurrentUser,
    InsertProfile,
    InsertPet,
    InsertActivity,
    ProfileName,
    Pets,
    Activities,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    SignOut,
    CurrentUser,
    InsertProfile(Profile),
    InsertPet(NewPet),
    InsertActivity(NewActivity),
    ProfileName(String),
    Pets(String),
    Activities(String, usize),
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    failures: HashMap<Op, String>,
    session: Option<SessionUser>,
    profiles: Vec<Profile>,
    pets: Vec<Pet>,
    activities: Vec<Activity>,
    loading: Option<watch::Receiver<bool>>,
    loading_seen: Vec<bool>,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<State>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend with `USER_ID` already signed in
    pub fn signed_in() -> Self {
        let backend = Self::new();
        backend.state().session = Some(session_user());
        backend
    }

    /// Make `op` fail with `message`; an empty message yields a blank error
    pub fn fail(self, op: Op, message: &str) -> Self {
        self.state().failures.insert(op, message.to_string());
        self
    }

    pub fn with_profile(self, name: &str) -> Self {
        self.state().profiles.push(Profile {
            id: USER_ID.to_string(),
            name: name.to_string(),
            email: "owner@example.com".to_string(),
        });
        self
    }

    pub fn with_pet(self, pet: Pet) -> Self {
        self.state().pets.push(pet);
        self
    }

    pub fn with_activity(self, activity: Activity) -> Self {
        self.state().activities.push(activity);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|call| op_of(call) == op).count()
    }

    /// Sample `loading` every time a call is made
    pub fn observe_loading(&self, loading: watch::Receiver<bool>) {
        self.state().loading = Some(loading);
    }

    /// The sampled values, one per call
    pub fn loading_seen(&self) -> Vec<bool> {
        self.state().loading_seen.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state().session.is_some()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: Call) -> Result<()> {
        let op = op_of(&call);
        let mut state = self.state();
        state.calls.push(call);
        if let Some(loading) = state.loading.as_ref().map(|rx| *rx.borrow()) {
            state.loading_seen.push(loading);
        }
        match state.failures.get(&op) {
            Some(message) => Err(failure(op, message)),
            None => Ok(()),
        }
    }
}

pub fn session_user() -> SessionUser {
    SessionUser {
        id: USER_ID.to_string(),
        email: Some("owner@example.com".to_string()),
    }
}

pub fn pet(id: &str, name: &str, status: &str, created_at: &str) -> Pet {
    Pet {
        id: id.to_string(),
        owner_id: Some(USER_ID.to_string()),
        name: name.to_string(),
        breed: "Beagle".to_string(),
        age: 3,
        photo_url: None,
        vaccination_status: status.to_string(),
        created_at: Some(created_at.to_string()),
    }
}

pub fn activity(id: &str, date: &str) -> Activity {
    Activity {
        id: id.to_string(),
        user_id: Some(USER_ID.to_string()),
        activity_date: date.to_string(),
        activity_type: "Vet Visit".to_string(),
        description: Some(format!("activity {}", id)),
        status: "Completed".to_string(),
    }
}

fn op_of(call: &Call) -> Op {
    match call {
        Call::SignIn { .. } => Op::SignIn,
        Call::SignUp { .. } => Op::SignUp,
        Call::SignOut => Op::SignOut,
        Call::CurrentUser => Op::CurrentUser,
        Call::InsertProfile(_) => Op::InsertProfile,
        Call::InsertPet(_) => Op::InsertPet,
        Call::InsertActivity(_) => Op::InsertActivity,
        Call::ProfileName(_) => Op::ProfileName,
        Call::Pets(_) => Op::Pets,
        Call::Activities(..) => Op::Activities,
    }
}

fn failure(op: Op, message: &str) -> PawcareError {
    if message.is_empty() {
        return PawcareError::general("");
    }
    match op {
        Op::SignIn | Op::SignUp | Op::SignOut | Op::CurrentUser => PawcareError::Auth(
            AuthError::ApiError(serde_json::json!({ "msg": message }).to_string()),
        ),
        _ => PawcareError::Postgrest(PostgrestError::ApiError {
            details: PostgrestApiErrorDetails {
                code: Some("42501".to_string()),
                message: Some(message.to_string()),
                details: None,
                hint: None,
            },
            status: StatusCode::FORBIDDEN,
        }),
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<SessionUser> {
        self.record(Call::SignIn {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let user = SessionUser {
            id: USER_ID.to_string(),
            email: Some(email.to_string()),
        };
        self.state().session = Some(user.clone());
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SessionUser> {
        self.record(Call::SignUp {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let user = SessionUser {
            id: USER_ID.to_string(),
            email: Some(email.to_string()),
        };
        self.state().session = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        // the session is dropped locally even if the server call fails
        let result = self.record(Call::SignOut);
        self.state().session = None;
        result
    }

    async fn current_user(&self) -> Result<Option<SessionUser>> {
        self.record(Call::CurrentUser)?;
        Ok(self.state().session.clone())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        self.record(Call::InsertProfile(profile.clone()))?;
        self.state().profiles.push(profile.clone());
        Ok(())
    }

    async fn insert_pet(&self, pet: &NewPet) -> Result<()> {
        self.record(Call::InsertPet(pet.clone()))
    }

    async fn insert_activity(&self, activity: &NewActivity) -> Result<()> {
        self.record(Call::InsertActivity(activity.clone()))
    }

    async fn profile_name(&self, user_id: &str) -> Result<Option<String>> {
        self.record(Call::ProfileName(user_id.to_string()))?;
        Ok(self
            .state()
            .profiles
            .iter()
            .find(|profile| profile.id == user_id)
            .map(|profile| profile.name.clone()))
    }

    async fn pets_for_owner(&self, owner_id: &str) -> Result<Vec<Pet>> {
        self.record(Call::Pets(owner_id.to_string()))?;
        let mut pets: Vec<Pet> = self
            .state()
            .pets
            .iter()
            .filter(|pet| pet.owner_id.as_deref() == Some(owner_id))
            .cloned()
            .collect();
        pets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pets)
    }

    async fn recent_activities(&self, user_id: &str, limit: usize) -> Result<Vec<Activity>> {
        self.record(Call::Activities(user_id.to_string(), limit))?;
        let mut activities: Vec<Activity> = self
            .state()
            .activities
            .iter()
            .filter(|activity| activity.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        activities.sort_by(|a, b| b.activity_date.cmp(&a.activity_date));
        activities.truncate(limit);
        Ok(activities)
    }
}
