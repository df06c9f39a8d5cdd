//! Login / signup form and its two validation schemas
//!
//! Each [`AuthMode`] owns an immutable [`FormSchema`]. Switching mode selects
//! the other schema; validators are never added to or removed from a field.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Lowest accepted pet birth year
pub const MIN_PET_YEAR: i32 = 1900;

/// Longest accepted email address
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Longest accepted part before the `@`
pub const MAX_EMAIL_LOCAL_LENGTH: usize = 64;

/// Shortest accepted password
pub const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Password,
    PetName,
    PetBreed,
    PetYear,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::Email,
        Field::Password,
        Field::PetName,
        Field::PetBreed,
        Field::PetYear,
    ];

    /// Form control name
    pub fn name(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::PetName => "petName",
            Field::PetBreed => "petBreed",
            Field::PetYear => "petYear",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a field value was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("is required")]
    Required,

    #[error("must be a valid email address")]
    Email,

    #[error("must be at least {0} characters")]
    MinLength(usize),

    #[error("must be a whole number")]
    Numeric,

    #[error("must be at least {0}")]
    Min(i32),
}

/// A single check on a field value.
///
/// Only `Required` rejects an empty value; the others judge non-empty input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    Required,
    Email,
    MinLength(usize),
    Numeric,
    Min(i32),
}

impl Validator {
    pub fn check(&self, value: &str) -> Result<(), ValidationError> {
        if value.is_empty() {
            return match self {
                Validator::Required => Err(ValidationError::Required),
                _ => Ok(()),
            };
        }

        match *self {
            Validator::Required => Ok(()),
            Validator::Email if !valid_email(value) => Err(ValidationError::Email),
            Validator::MinLength(min) if value.chars().count() < min => {
                Err(ValidationError::MinLength(min))
            }
            Validator::Numeric if value.trim().parse::<i32>().is_err() => {
                Err(ValidationError::Numeric)
            }
            Validator::Min(min) => match value.trim().parse::<i32>() {
                Ok(number) if number < min => Err(ValidationError::Min(min)),
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

// Dot-separated atext local part, hostname labels of at most 63 characters.
// The length limits cannot be expressed without look-ahead and are checked
// separately.
const EMAIL_PATTERN: &str = concat!(
    r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*",
    r"@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
    r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
);

fn valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();

    if email.len() > MAX_EMAIL_LENGTH {
        return false;
    }
    match email.split_once('@') {
        Some((local, _)) if local.len() <= MAX_EMAIL_LOCAL_LENGTH => {}
        _ => return false,
    }

    EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

#[derive(Debug)]
pub struct FieldRule {
    pub field: Field,
    pub validators: &'static [Validator],
}

/// The validators of every field in one mode
#[derive(Debug)]
pub struct FormSchema {
    pub mode: AuthMode,
    rules: &'static [FieldRule],
}

const EMAIL_RULE: FieldRule = FieldRule {
    field: Field::Email,
    validators: &[Validator::Required, Validator::Email],
};

const PASSWORD_RULE: FieldRule = FieldRule {
    field: Field::Password,
    validators: &[Validator::Required, Validator::MinLength(MIN_PASSWORD_LENGTH)],
};

pub static LOGIN_SCHEMA: FormSchema = FormSchema {
    mode: AuthMode::Login,
    rules: &[EMAIL_RULE, PASSWORD_RULE],
};

pub static SIGNUP_SCHEMA: FormSchema = FormSchema {
    mode: AuthMode::Signup,
    rules: &[
        FieldRule {
            field: Field::Name,
            validators: &[Validator::Required],
        },
        EMAIL_RULE,
        PASSWORD_RULE,
        FieldRule {
            field: Field::PetName,
            validators: &[Validator::Required],
        },
        FieldRule {
            field: Field::PetBreed,
            validators: &[Validator::Required],
        },
        FieldRule {
            field: Field::PetYear,
            validators: &[
                Validator::Required,
                Validator::Numeric,
                Validator::Min(MIN_PET_YEAR),
            ],
        },
    ],
};

impl FormSchema {
    /// Validators applied to `field`; empty when the field is unchecked
    pub fn validators_for(&self, field: Field) -> &'static [Validator] {
        self.rules
            .iter()
            .find(|rule| rule.field == field)
            .map(|rule| rule.validators)
            .unwrap_or(&[])
    }

    pub fn is_required(&self, field: Field) -> bool {
        self.validators_for(field).contains(&Validator::Required)
    }

    /// First failing check per field, in field order
    pub fn validate(&self, values: &FormValues) -> Vec<FieldError> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let value = values.get(rule.field);
                rule.validators
                    .iter()
                    .find_map(|validator| validator.check(value).err())
                    .map(|error| FieldError {
                        field: rule.field,
                        error,
                    })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub error: ValidationError,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Signup,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Signup,
            AuthMode::Signup => AuthMode::Login,
        }
    }

    pub fn schema(self) -> &'static FormSchema {
        match self {
            AuthMode::Login => &LOGIN_SCHEMA,
            AuthMode::Signup => &SIGNUP_SCHEMA,
        }
    }
}

/// Raw text entered in each field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub name: String,
    pub email: String,
    pub password: String,
    pub pet_name: String,
    pub pet_breed: String,
    pub pet_year: String,
}

impl FormValues {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Password => &self.password,
            Field::PetName => &self.pet_name,
            Field::PetBreed => &self.pet_breed,
            Field::PetYear => &self.pet_year,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
            Field::PetName => &mut self.pet_name,
            Field::PetBreed => &mut self.pet_breed,
            Field::PetYear => &mut self.pet_year,
        };
        *slot = value;
    }
}

/// Form state: the mode plus what has been typed
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    mode: AuthMode,
    values: FormValues,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self {
            mode,
            values: FormValues::default(),
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn schema(&self) -> &'static FormSchema {
        self.mode.schema()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.set(field, value.into());
    }

    /// Switch mode and clear every value
    pub fn toggle(&mut self) {
        self.mode = self.mode.toggled();
        self.values = FormValues::default();
    }

    pub fn errors(&self) -> Vec<FieldError> {
        self.schema().validate(&self.values)
    }

    pub fn field_error(&self, field: Field) -> Option<ValidationError> {
        self.errors()
            .into_iter()
            .find(|e| e.field == field)
            .map(|e| e.error)
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }
}
