use anyhow::Context;
use clap::{Parser, Subcommand};
use lets_connect::registration::http::build_client;
use lets_connect::registration::{
    FederatedProvider, FirebaseAuth, FirebaseStorage, ImageFile, LoginForm, MediaSelection,
    RegistrationConfig, SignupForm, SignupOrchestrator, StorageUserDirectory, SubmissionState,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lets-connect")]
#[command(about = "Create or sign in to a Let's Connect account")]
struct Args {
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign up with email and password
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = clap::value_parser!(u32).range(18..))]
        age: u32,
        #[arg(long)]
        location: String,
        #[arg(long)]
        state_of_origin: String,
        /// Comma separated, e.g. "Reading, Hiking, Coding"
        #[arg(long, default_value = "")]
        interests: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm_password: String,
        #[arg(long)]
        profile_image: Option<PathBuf>,
        /// Up to 3, extra ones are ignored
        #[arg(long)]
        additional_image: Vec<PathBuf>,
    },
    /// Sign up or sign in with a Google account
    Google,
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

async fn read_image(path: &Path) -> anyhow::Result<ImageFile> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("read image {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    Ok(ImageFile::from_bytes(file_name, data))
}

fn build_orchestrator(config: &RegistrationConfig) -> anyhow::Result<SignupOrchestrator> {
    let client = build_client().context("build HTTPS client")?;
    let auth = Arc::new(FirebaseAuth::new(config, client.clone()));
    let storage = Arc::new(FirebaseStorage::new(config, client));

    let mut orchestrator = SignupOrchestrator::new(auth, storage.clone())
        .with_landing_route(config.landing_route.clone());
    if config.persist_profiles {
        orchestrator = orchestrator.with_record_store(Arc::new(StorageUserDirectory::new(storage)));
    }
    Ok(orchestrator)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = RegistrationConfig::from_file(&args.config).context("load config")?;
    let orchestrator = build_orchestrator(&config)?;
    let mut state = SubmissionState::new();

    let redirect = match args.command {
        Command::Signup {
            name,
            age,
            location,
            state_of_origin,
            interests,
            email,
            password,
            confirm_password,
            profile_image,
            additional_image,
        } => {
            let form = SignupForm {
                name,
                age: age.to_string(),
                location,
                state_of_origin,
                interests,
                email,
                password,
                confirm_password,
            };

            let profile = match profile_image {
                Some(path) => Some(read_image(&path).await?),
                None => None,
            };
            let mut additional = Vec::new();
            for path in &additional_image {
                additional.push(read_image(path).await?);
            }
            let media = MediaSelection::new(profile, additional);

            orchestrator
                .submit_email_signup(&mut state, &form, &media)
                .await
                .map(|done| {
                    info!("Profile picture: {}", done.record.profile_pic_url);
                    done.redirect_to
                })
        }
        Command::Google => orchestrator
            .federated_sign_in(&mut state, FederatedProvider::Google)
            .await
            .map(|done| done.redirect_to),
        Command::Login { email, password } => orchestrator
            .sign_in(&mut state, &LoginForm { email, password })
            .await
            .map(|done| done.redirect_to),
    };

    match redirect {
        Ok(route) => {
            println!("Redirecting to {}", route);
            Ok(ExitCode::SUCCESS)
        }
        Err(_) => {
            eprintln!("{}", state.error().unwrap_or("Signup failed."));
            Ok(ExitCode::FAILURE)
        }
    }
}
