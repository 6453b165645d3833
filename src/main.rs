//! speechix CLI entry point.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use speechix_client::api::{Api, HttpApi, User, download};
use speechix_client::cli::{AdminCommand, Args, Command, PlayKind, VoicesCommand};
use speechix_client::config::Config;
use speechix_client::generation::{
    GenerationController, GenerationEvent, GenerationOutcome, ValidationError, can_generate,
    credits_needed,
};
use speechix_client::logging;
use speechix_client::panels::{
    Access, AccountSummary, AdminPanel, ProfileLoad, SubscriptionForm, UsageSummary, admin,
    auth_forms, check_access, library, load_profile,
};
use speechix_client::playback::{PlaybackController, ProcessSink};
use speechix_client::session::SessionStore;
use tracing::Level;

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    logging::init(if args.verbose {
        Level::DEBUG
    } else {
        config.log_level
    });

    let session = config.session_store();
    let api = Arc::new(HttpApi::new(&config.api_url, &config.api_base, session.clone()));
    tracing::debug!(base_url = api.base_url(), "client ready");

    match args.command {
        Command::Login { email, password } => {
            let user = auth_forms::login(&*api, &session, &email, &password)
                .context("Login failed")?;
            println!("Signed in as {}", user.email);
        }
        Command::Register {
            email,
            password,
            confirm_password,
        } => {
            let user = auth_forms::register(&*api, &session, &email, &password, &confirm_password)
                .context("Registration failed")?;
            println!("Account created for {}", user.email);
        }
        Command::Guest => {
            auth_forms::enter_guest(&session);
            println!("Continuing as guest.");
        }
        Command::Logout => {
            auth_forms::logout(&session);
            println!("Signed out.");
        }
        Command::Dashboard => {
            let user = protected(&*api, &session, false)?;
            show_dashboard(&user);
        }
        Command::Generate {
            text,
            voice,
            language,
            timeout,
            output,
        } => {
            let user = protected(&*api, &session, false)?;
            generate(
                &api,
                &session,
                &config,
                &user,
                &text,
                voice.as_deref(),
                &language,
                timeout.map(Duration::from_secs),
                output.as_deref(),
            )?;
        }
        Command::Cancel { id } => {
            protected(&*api, &session, false)?;
            api.cancel(&id)
                .with_context(|| format!("Failed to cancel job '{id}'"))?;
            println!("Cancelled job {id}.");
        }
        Command::History { download } => {
            protected(&*api, &session, false)?;
            match download {
                Some(id) => download_history_item(&api, &id)?,
                None => list_history(&*api)?,
            }
        }
        Command::Voices { command } => {
            protected(&*api, &session, false)?;
            match command {
                VoicesCommand::List => list_voices(&*api)?,
                VoicesCommand::Upload { file } => {
                    let voice = library::upload_voice(&*api, &file)
                        .with_context(|| format!("Failed to upload {}", file.display()))?;
                    println!("Voice uploaded: {} ({})", voice.name, voice.id);
                }
            }
        }
        Command::Play { kind, id } => {
            protected(&*api, &session, false)?;
            play(&api, &config, kind, &id)?;
        }
        Command::Admin { command } => {
            protected(&*api, &session, true)?;
            run_admin(&*api, command)?;
        }
    }

    Ok(())
}

/// Gate a protected command and load the current profile.
fn protected<A: Api + ?Sized>(api: &A, session: &SessionStore, require_admin: bool) -> Result<User> {
    match check_access(session, require_admin) {
        Access::Granted => {}
        Access::RedirectToLogin => {
            bail!("Not signed in. Run `speechix login` or `speechix guest` first.")
        }
        Access::RedirectToApp => bail!("This command requires an administrator account."),
    }

    match load_profile(api, session) {
        ProfileLoad::Loaded(user) => Ok(user),
        ProfileLoad::RedirectToLogin { message } => {
            bail!("{message}. Please sign in again.")
        }
    }
}

fn show_dashboard(user: &User) {
    let usage = UsageSummary::from_user(Some(user), Utc::now());
    let account = AccountSummary::from_user(Some(user));

    println!("[{}] {}", account.initial, account.email);
    if usage.is_guest {
        println!("  Guest mode: sign up to keep your work.");
    }
    println!("  Plan: {}", account.plan);
    println!("  Subscription: {}", account.subscription);
    println!();
    println!(
        "Credits: {} remaining of {} ({} used, {:.0}%)",
        usage.remaining_credits, usage.total_credits, usage.used_credits, usage.usage_percent
    );
    println!("Time remaining: {}", usage.subscription_label());
    if usage.is_expired() {
        println!("Your subscription has expired. Contact support to renew.");
    }
}

#[allow(clippy::too_many_arguments)]
fn generate(
    api: &Arc<HttpApi>,
    session: &SessionStore,
    config: &Config,
    user: &User,
    text: &str,
    voice: Option<&str>,
    language: &str,
    timeout: Option<Duration>,
    output: Option<&Path>,
) -> Result<()> {
    if !can_generate(Some(user)) {
        bail!("{}", ValidationError::NoCredits);
    }
    let mut controller = GenerationController::with_interval(Arc::clone(api), config.poll_interval);

    println!(
        "Generating speech ({} credits, {} available)...",
        credits_needed(text),
        user.remaining_credits()
    );
    let job = controller
        .generate(text, voice, Some(language))
        .context("Failed to start generation")?;
    println!("  Job: {}", job.id);

    let outcome = controller
        .wait(timeout, |event| match event {
            GenerationEvent::Status(job) => println!("  Status: {}", job.status.as_str()),
            GenerationEvent::Completed(_) => println!("  Status: completed"),
            GenerationEvent::Failed(_) | GenerationEvent::Cancelled => {}
        })
        .context("Lost track of the generation job")?;

    match outcome {
        GenerationOutcome::Completed(job) => {
            // Credits changed on the server.
            if let ProfileLoad::Loaded(user) = load_profile(&**api, session) {
                println!("Credits remaining: {}", user.remaining_credits());
            }

            let Some(audio_url) = job.audio_url.filter(|url| !url.is_empty()) else {
                println!("Generation finished without audio.");
                return Ok(());
            };
            let url = api.resolve_url(&audio_url)?;
            match output {
                Some(path) => save_audio(&url, path)?,
                None => println!("Audio ready: {url}"),
            }
            Ok(())
        }
        GenerationOutcome::Failed(message) => bail!("{message}"),
        GenerationOutcome::Cancelled => {
            println!("Generation cancelled.");
            Ok(())
        }
    }
}

fn save_audio(url: &str, path: &Path) -> Result<()> {
    let bytes = download(url).with_context(|| format!("Failed to download {url}"))?;
    fs::write(path, &bytes)
        .with_context(|| format!("Failed to write audio to: {}", path.display()))?;

    println!("Audio saved to: {}", path.display());
    println!("  Size: {} bytes", bytes.len());
    Ok(())
}

fn list_history<A: Api + ?Sized>(api: &A) -> Result<()> {
    println!("{}", library::LOADING_MESSAGE);
    let items = library::load_history(api)?;

    if items.is_empty() {
        println!("{}", library::NO_HISTORY_MESSAGE);
        return Ok(());
    }

    for item in items {
        println!("  {} [{}] {}", item.id, item.status, item.created_at);
        println!("    Voice: {}", item.voice_id);
        println!("    Text: {}", item.text);
    }
    Ok(())
}

fn download_history_item(api: &HttpApi, id: &str) -> Result<()> {
    let items = library::load_history(api)?;
    let item = library::find_history_item(&items, id)
        .with_context(|| format!("History item '{id}' not found"))?;

    let file_name = library::download_file_name(item)?;
    let url = api.resolve_url(item.audio_url.as_deref().unwrap_or_default())?;
    save_audio(&url, Path::new(&file_name))
}

fn list_voices<A: Api + ?Sized>(api: &A) -> Result<()> {
    println!("{}", library::LOADING_MESSAGE);
    let voices = library::load_voices(api)?;

    if voices.is_empty() {
        println!("{}", library::NO_VOICES_MESSAGE);
        return Ok(());
    }

    println!("Your voices:");
    for voice in voices {
        println!("  {} ({})", voice.name, voice.id);
        println!("    Created: {}", voice.created_at);
    }
    Ok(())
}

fn play(api: &Arc<HttpApi>, config: &Config, kind: PlayKind, id: &str) -> Result<()> {
    let audio_url = match kind {
        PlayKind::Voice => {
            let voices = library::load_voices(&**api)?;
            library::find_voice(&voices, id)
                .with_context(|| format!("Voice '{id}' not found"))?
                .audio_url
                .clone()
        }
        PlayKind::History => {
            let items = library::load_history(&**api)?;
            library::find_history_item(&items, id)
                .with_context(|| format!("History item '{id}' not found"))?
                .audio_url
                .clone()
        }
    };

    let player = config.player.clone();
    let resolver = Arc::clone(api);
    let mut playback = PlaybackController::new(move |url: &str| {
        ProcessSink::open(&resolver.resolve_url(url)?, player.clone())
    });

    if !playback.play(id, audio_url.as_deref())? {
        println!("No audio available for '{id}'.");
        return Ok(());
    }

    match playback.sink(id).and_then(ProcessSink::info) {
        Some(info) => println!("Playing '{id}' ({:.1}s)...", info.duration_secs),
        None => println!("Playing '{id}'..."),
    }
    while playback.now_playing().is_some() {
        thread::sleep(Duration::from_millis(200));
    }
    Ok(())
}

fn run_admin<A: Api + ?Sized>(api: &A, command: AdminCommand) -> Result<()> {
    let mut panel = AdminPanel::new();

    match command {
        AdminCommand::Users { search } => {
            println!("{}", admin::LOADING_USERS_MESSAGE);
            panel.load(api)?;
            if let Some(query) = search {
                panel.set_query(query);
            }

            if let Some(message) = panel.empty_message() {
                println!("{message}");
                return Ok(());
            }
            for entry in panel.visible() {
                println!(
                    "  {} {} [{}] credits {}/{} {}",
                    entry.user.id,
                    entry.user.email,
                    entry.user.status.as_str(),
                    entry.user.used_credits,
                    entry.user.credits,
                    entry.user.subscription_expiry.as_deref().unwrap_or("-"),
                );
            }
        }
        AdminCommand::User { id } => {
            let entry = panel.select(api, &id)?;
            let form = SubscriptionForm::from_user(entry);
            println!("{} ({})", entry.user.email, entry.user.id);
            println!("  Joined: {}", entry.created_at);
            println!("  Credits: {}", form.credits);
            println!("  Expiry: {}", form.subscription_expiry);
            println!("  Status: {}", form.status.as_str());
        }
        AdminCommand::Update {
            id,
            credits,
            expiry,
            status,
        } => {
            let mut form = SubscriptionForm::from_user(panel.select(api, &id)?);
            if let Some(credits) = credits {
                form.credits = credits;
            }
            if let Some(expiry) = expiry {
                form.subscription_expiry = expiry;
            }
            if let Some(status) = status {
                form.status = status.into();
            }

            let updated = panel.update(api, &form)?;
            println!("Subscription updated successfully");
            println!(
                "  {} credits {} expiry {} [{}]",
                updated.user.email,
                updated.user.credits,
                updated.user.subscription_expiry.as_deref().unwrap_or("-"),
                updated.user.status.as_str(),
            );
        }
    }
    Ok(())
}
