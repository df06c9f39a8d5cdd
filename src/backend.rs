//! The hosted service the flows talk to
//!
//! [`Backend`] lists every call the auth and dashboard flows make.
//! [`SupabaseBackend`] implements it on top of the auth and table clients.

use async_trait::async_trait;
use reqwest::Client;

use pawcare_auth::{Auth, AuthOptions};
use pawcare_postgrest::{PostgrestClient, SortOrder};

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::{
    Activity, NewActivity, NewPet, Pet, Profile, SessionUser, ACTIVITIES_TABLE, PETS_TABLE,
    PROFILES_TABLE,
};

/// Calls made against the hosted auth/data service
#[async_trait]
pub trait Backend: Send + Sync {
    /// Password sign-in; starts a session
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<SessionUser>;

    /// Registers a new account
    async fn sign_up(&self, email: &str, password: &str) -> Result<SessionUser>;

    async fn sign_out(&self) -> Result<()>;

    /// The user of the current session, `None` when signed out
    async fn current_user(&self) -> Result<Option<SessionUser>>;

    async fn insert_profile(&self, profile: &Profile) -> Result<()>;

    async fn insert_pet(&self, pet: &NewPet) -> Result<()>;

    async fn insert_activity(&self, activity: &NewActivity) -> Result<()>;

    /// Name on the profile with `user_id`, if that profile exists
    async fn profile_name(&self, user_id: &str) -> Result<Option<String>>;

    /// All pets of `owner_id`, newest first
    async fn pets_for_owner(&self, owner_id: &str) -> Result<Vec<Pet>>;

    /// The `limit` latest activities of `user_id`, newest first
    async fn recent_activities(&self, user_id: &str, limit: usize) -> Result<Vec<Activity>>;
}

#[derive(serde::Deserialize)]
struct ProfileName {
    name: String,
}

/// [`Backend`] backed by a Supabase project
pub struct SupabaseBackend {
    config: AppConfig,
    http_client: Client,
    auth: Auth,
}

impl SupabaseBackend {
    pub fn new(config: AppConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        let auth = Auth::new(
            config.base_url(),
            &config.anon_key,
            http_client.clone(),
            AuthOptions {
                persist_session: config.options.persist_session,
            },
        );

        Ok(Self {
            config,
            http_client,
            auth,
        })
    }

    /// Query builder for `table`, authorized as the session user when signed in
    pub fn from(&self, table: &str) -> PostgrestClient {
        let client = PostgrestClient::new(
            self.config.base_url(),
            &self.config.anon_key,
            table,
            self.http_client.clone(),
        )
        .schema(&self.config.options.db_schema);

        match self.auth.access_token() {
            Some(token) => client.with_auth(&token),
            None => client,
        }
    }
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<SessionUser> {
        let session = self.auth.sign_in_with_password(email, password).await?;
        Ok(session.user.into())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SessionUser> {
        let response = self.auth.sign_up(email, password).await?;
        if response.session().is_none() {
            tracing::info!(email, "sign-up pending email confirmation");
        }
        Ok(response.user().clone().into())
    }

    async fn sign_out(&self) -> Result<()> {
        self.auth.sign_out().await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<SessionUser>> {
        if self.auth.get_session().is_none() {
            return Ok(None);
        }
        let user = self.auth.get_user().await?;
        Ok(Some(user.into()))
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        self.from(PROFILES_TABLE).insert(profile).await?;
        Ok(())
    }

    async fn insert_pet(&self, pet: &NewPet) -> Result<()> {
        self.from(PETS_TABLE).insert(pet).await?;
        Ok(())
    }

    async fn insert_activity(&self, activity: &NewActivity) -> Result<()> {
        self.from(ACTIVITIES_TABLE).insert(activity).await?;
        Ok(())
    }

    async fn profile_name(&self, user_id: &str) -> Result<Option<String>> {
        let row = self
            .from(PROFILES_TABLE)
            .select("name")
            .eq("id", user_id)
            .maybe_single::<ProfileName>()
            .await?;
        Ok(row.map(|profile| profile.name))
    }

    async fn pets_for_owner(&self, owner_id: &str) -> Result<Vec<Pet>> {
        let pets = self
            .from(PETS_TABLE)
            .select("*")
            .eq("owner_id", owner_id)
            .order("created_at", SortOrder::Descending)
            .execute::<Pet>()
            .await?;
        Ok(pets)
    }

    async fn recent_activities(&self, user_id: &str, limit: usize) -> Result<Vec<Activity>> {
        let activities = self
            .from(ACTIVITIES_TABLE)
            .select("*")
            .eq("user_id", user_id)
            .order("activity_date", SortOrder::Descending)
            .limit(limit)
            .execute::<Activity>()
            .await?;
        Ok(activities)
    }
}
