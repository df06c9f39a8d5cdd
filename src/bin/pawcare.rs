//! Command line front end for PawCare
//!
//! ```text
//! pawcare login --email user@test.com --password secret1
//! pawcare signup --name Ada --email ada@example.com --password secret1 \
//!     --pet-name Rex --pet-breed Beagle --pet-year 2020 --logout
//! ```
//!
//! The project is read from `SUPABASE_URL` and `SUPABASE_ANON_KEY` (a `.env`
//! file is honoured).

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use pawcare::auth::{AuthController, AuthMode, Field, SubmitOutcome};
use pawcare::backend::SupabaseBackend;
use pawcare::config::AppConfig;
use pawcare::dashboard::{format_date, vaccination_icon, DashboardLoader, DashboardView};
use pawcare::error::Result;
use pawcare::navigation::{Route, RouteHistory};

#[derive(Parser)]
#[command(name = "pawcare", version, about = "Sign in to PawCare and show your dashboard")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with an existing account
    Login {
        #[command(flatten)]
        credentials: Credentials,

        /// Sign out after showing the dashboard
        #[arg(long)]
        logout: bool,
    },
    /// Create an account and register your first pet
    Signup {
        #[arg(long)]
        name: String,

        #[command(flatten)]
        credentials: Credentials,

        #[arg(long)]
        pet_name: String,

        #[arg(long)]
        pet_breed: String,

        /// Year the pet was born
        #[arg(long)]
        pet_year: String,

        /// Sign out after showing the dashboard
        #[arg(long)]
        logout: bool,
    },
}

#[derive(Args)]
struct Credentials {
    #[arg(long, env = "PAWCARE_EMAIL")]
    email: String,

    #[arg(long, env = "PAWCARE_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Command) -> Result<ExitCode> {
    let config = AppConfig::from_env()?;
    let backend = Arc::new(SupabaseBackend::new(config)?);
    let navigator = Arc::new(RouteHistory::default());

    let mut controller = AuthController::new(backend.clone(), navigator.clone());
    let logout = fill_form(&mut controller, command);

    match controller.submit().await {
        SubmitOutcome::Invalid => {
            for error in controller.form().errors() {
                eprintln!("{}", error);
            }
            return Ok(ExitCode::from(2));
        }
        SubmitOutcome::Failed => {
            eprintln!("{}", controller.error_message().unwrap_or("Request failed"));
            if controller.account_created() {
                eprintln!("The account was created but its records are incomplete.");
            }
            return Ok(ExitCode::FAILURE);
        }
        SubmitOutcome::LoggedIn | SubmitOutcome::SignedUp => {}
    }

    if navigator.current() != Some(Route::Dashboard) {
        return Ok(ExitCode::SUCCESS);
    }

    let mut dashboard = DashboardLoader::new(backend, navigator.clone());
    if dashboard.activate().await.is_none() {
        println!("No active session; confirm your email address, then log in.");
        return Ok(ExitCode::SUCCESS);
    }
    render(dashboard.view());

    if logout {
        dashboard.logout().await;
        if let Some(route) = navigator.current() {
            println!("Signed out, back to {}", route);
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Puts the command's arguments into the form; returns the `--logout` flag.
fn fill_form(controller: &mut AuthController, command: Command) -> bool {
    match command {
        Command::Login {
            credentials,
            logout,
        } => {
            controller.set_value(Field::Email, credentials.email);
            controller.set_value(Field::Password, credentials.password);
            logout
        }
        Command::Signup {
            name,
            credentials,
            pet_name,
            pet_breed,
            pet_year,
            logout,
        } => {
            if controller.mode() == AuthMode::Login {
                controller.toggle_form();
            }
            controller.set_value(Field::Name, name);
            controller.set_value(Field::Email, credentials.email);
            controller.set_value(Field::Password, credentials.password);
            controller.set_value(Field::PetName, pet_name);
            controller.set_value(Field::PetBreed, pet_breed);
            controller.set_value(Field::PetYear, pet_year);
            logout
        }
    }
}

fn render(view: &DashboardView) {
    println!("Welcome back, {}!", view.user_name);

    println!();
    println!("My pets");
    if view.pets.is_empty() {
        println!("  (none yet)");
    }
    for pet in &view.pets {
        println!(
            "  {} {} - {}, {} years, vaccinations: {}",
            vaccination_icon(&pet.vaccination_status),
            pet.name,
            pet.breed,
            pet.age,
            pet.vaccination_status
        );
    }

    println!();
    println!("Recent activity");
    if view.activities.is_empty() {
        println!("  (nothing yet)");
    }
    for activity in &view.activities {
        println!(
            "  {}  {} [{}] {}",
            format_date(&activity.activity_date),
            activity.activity_type,
            activity.status,
            activity.description.as_deref().unwrap_or_default()
        );
    }
}
