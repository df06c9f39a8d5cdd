//! Records stored in the backend tables

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

pub const PROFILES_TABLE: &str = "profiles";
pub const PETS_TABLE: &str = "pets";
pub const ACTIVITIES_TABLE: &str = "activities";

/// Vaccination status given to a pet registered at signup
pub const DEFAULT_VACCINATION_STATUS: &str = "Up to Date";

pub const ACCOUNT_CREATED_ACTIVITY: &str = "Account Created";
const ACCOUNT_CREATED_DESCRIPTION: &str = "Welcome to PawCare!";
const ACCOUNT_CREATED_STATUS: &str = "Completed";

/// The authenticated principal. `id` keys every per-user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: Option<String>,
}

impl From<pawcare_auth::User> for SessionUser {
    fn from(user: pawcare_auth::User) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Row of `profiles`; `id` equals the owning user's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Pet row as written at signup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPet {
    pub owner_id: String,
    pub name: String,
    pub breed: String,
    pub age: i32,
    pub vaccination_status: String,
}

impl NewPet {
    /// `age` is derived as `current_year - birth_year`.
    pub fn new(
        owner_id: &str,
        name: &str,
        breed: &str,
        birth_year: i32,
        current_year: i32,
    ) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            breed: breed.to_string(),
            age: current_year - birth_year,
            vaccination_status: DEFAULT_VACCINATION_STATUS.to_string(),
        }
    }
}

/// Pet row as read for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub breed: String,
    pub age: i32,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub vaccination_status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Activity row as written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewActivity {
    pub user_id: String,
    pub activity_date: String,
    pub activity_type: String,
    pub description: String,
    pub status: String,
}

impl NewActivity {
    /// The entry recorded when an account is created on `date`
    pub fn account_created(user_id: &str, date: NaiveDate) -> Self {
        Self {
            user_id: user_id.to_string(),
            activity_date: date.format("%Y-%m-%d").to_string(),
            activity_type: ACCOUNT_CREATED_ACTIVITY.to_string(),
            description: ACCOUNT_CREATED_DESCRIPTION.to_string(),
            status: ACCOUNT_CREATED_STATUS.to_string(),
        }
    }
}

/// Activity row as read for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub activity_date: String,
    pub activity_type: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
}

// Columns filled in outside the app may hold NULL
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
