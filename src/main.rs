// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};

use poddigest::{
    API_URL_ENV, AdminPanel, AdminState, ApiClient, ApiConfig, DEFAULT_API_URL, NoopReporter,
    PodcastFull, PodcastGrid, PodcastUpdate, ProgressEvent, ProgressReporter, ReqwestClient,
    Route, SharedProgressReporter, SubmitOutcome, SubscribeForm, SubscribeStatus, ToggleOutcome,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static MAIL: Emoji<'_, '_> = Emoji("📨 ", "[@] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static BELL: Emoji<'_, '_> = Emoji("🔔 ", "[*] ");
static WRENCH: Emoji<'_, '_> = Emoji("🔧 ", "[#] ");

/// Podcast Digest: browse podcasts, subscribe to the newsletter, manage the catalogue
#[derive(Parser, Debug)]
#[command(name = "poddigest")]
#[command(about = "Browse podcasts, subscribe to the newsletter and manage the catalogue")]
#[command(version)]
struct Args {
    /// Base URL of the Podcast Digest API
    #[arg(long, global = true, env = API_URL_ENV, default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Quiet mode - suppress spinners and alerts
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the public podcast grid
    Podcasts {
        /// Print the grid as an HTML fragment
        #[arg(long)]
        html: bool,
    },

    /// Subscribe an email address to the weekly digest
    Subscribe {
        email: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, default_value = poddigest::subscribe::DEFAULT_UTM_SOURCE)]
        utm_source: String,

        #[arg(long, default_value = poddigest::subscribe::DEFAULT_UTM_MEDIUM)]
        utm_medium: String,
    },

    /// Open a site link; `#admin` links go to the admin panel
    Open { location: String },

    /// Manage podcasts
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },

    /// Check whether the newsletter service is configured
    Health,
}

#[derive(Subcommand, Debug)]
enum AdminCommand {
    /// List every podcast, active or not
    List,

    /// Add a podcast
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        rss_url: String,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        cover_image_url: String,
    },

    /// Add a podcast, reading its details from the feed
    AddFromRss { rss_url: String },

    /// Activate or deactivate a podcast
    Toggle { id: u64 },

    /// Change individual fields of a podcast
    Update {
        id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        rss_url: Option<String>,

        #[arg(long)]
        cover_image_url: Option<String>,

        /// true to show the podcast on the site, false to hide it
        #[arg(long)]
        active: Option<bool>,
    },

    /// Delete a podcast
    Delete { id: u64 },
}

/// Spinner for in-flight requests, alerts printed above it
struct SpinnerReporter {
    current: Mutex<Option<ProgressBar>>,
}

impl SpinnerReporter {
    fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    fn start(&self, message: String) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = current.take() {
            bar.finish_and_clear();
        }

        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {wide_msg}")
        {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_message(message);
        *current = Some(bar);
    }

    fn finish(&self) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(bar) = current.take() {
            bar.finish_and_clear();
        }
    }
}

impl ProgressReporter for SpinnerReporter {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::LoadingPodcasts { .. } => {
                self.start(format!("{SEARCH}Loading podcasts..."));
            }
            ProgressEvent::PodcastsLoaded { .. } => self.finish(),
            ProgressEvent::LoadFailed { error, .. } => {
                self.finish();
                eprintln!("{FAILURE}{} {}", "Failed to load podcasts:".red(), error.dimmed());
            }
            ProgressEvent::CreatingPodcast { name } => {
                self.start(format!("{WRENCH}Adding {}", name.cyan()));
            }
            ProgressEvent::UpdatingPodcast { id } => {
                self.start(format!("{WRENCH}Updating podcast {}", id.to_string().cyan()));
            }
            ProgressEvent::DeletingPodcast { id } => {
                self.start(format!("{WRENCH}Deleting podcast {}", id.to_string().cyan()));
            }
            ProgressEvent::Subscribing { email } => {
                self.start(format!("{MAIL}Subscribing {}", email.cyan()));
            }
            ProgressEvent::Alert { message } => {
                self.finish();
                println!("{BELL}{}", message.bold().yellow());
            }
        }
    }
}

/// Initialize tracing on stderr. Respects RUST_LOG and PODDIGEST_LOG_FORMAT.
fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let builder = tracing_subscriber::registry().with(filter);

    match std::env::var("PODDIGEST_LOG_FORMAT").as_deref() {
        Ok("json") => {
            let _ = builder.with(fmt_layer.json().flatten_event(true)).try_init();
        }
        _ => {
            let _ = builder.with(fmt_layer.compact()).try_init();
        }
    }
}

fn print_grid(grid: &PodcastGrid) {
    println!("\n{}", "精选播客".bold());
    if grid.is_demo() {
        println!("{}", "(no active podcasts yet, showing examples)".dimmed());
    }

    for card in grid.cards() {
        let id = card
            .id
            .map(|id| format!("[{id}] "))
            .unwrap_or_default();
        println!("\n{HEADPHONES}{}{}", id.dimmed(), card.name.bold().green());
        println!("   {}", card.description);
        println!("   {}", card.image_url.dimmed());
    }
    println!();
}

fn status_badge(podcast: &PodcastFull) -> colored::ColoredString {
    if podcast.is_active {
        "Active".green().bold()
    } else {
        "Inactive".red().bold()
    }
}

fn print_admin_list(state: &AdminState) {
    println!(
        "\n{}",
        format!("Current Podcasts ({})", state.podcasts.len()).bold()
    );

    for podcast in &state.podcasts {
        println!(
            "\n  [{}] {} {}",
            podcast.id.to_string().cyan(),
            podcast.name.bold(),
            status_badge(podcast)
        );
        if let Some(description) = podcast.description.as_deref().filter(|d| !d.is_empty()) {
            println!("      {description}");
        }
        println!("      {}", podcast.rss_url.dimmed());
    }
    println!();
}

fn print_podcast(podcast: &PodcastFull) {
    println!(
        "{SUCCESS}[{}] {} {}",
        podcast.id.to_string().cyan(),
        podcast.name.bold(),
        status_badge(podcast)
    );
}

async fn show_grid(api: &ApiClient<ReqwestClient>, reporter: &SharedProgressReporter, html: bool) {
    let grid = PodcastGrid::load(api, reporter).await;
    if html {
        print!("{}", grid.render_html());
    } else {
        print_grid(&grid);
    }
}

async fn run_admin(
    api: ApiClient<ReqwestClient>,
    reporter: SharedProgressReporter,
    command: AdminCommand,
) -> Result<()> {
    let panel = AdminPanel::new(api.clone(), reporter);

    match command {
        AdminCommand::List => {
            panel.load().await;
            print_admin_list(&panel.snapshot());
        }

        AdminCommand::Add {
            name,
            rss_url,
            description,
            cover_image_url,
        } => {
            panel.load().await;
            panel.toggle_form();
            panel.edit_draft(|draft| {
                draft.name = name;
                draft.rss_url = rss_url;
                draft.description = description;
                draft.cover_image_url = cover_image_url;
            });

            match panel.submit().await {
                SubmitOutcome::Created(podcast) => {
                    print_podcast(&podcast);
                    print_admin_list(&panel.snapshot());
                }
                SubmitOutcome::Invalid(reason) => bail!("Invalid podcast: {reason}"),
                SubmitOutcome::Failed(e) => {
                    return Err(e).context("Failed to add podcast");
                }
                SubmitOutcome::AlreadySubmitting | SubmitOutcome::FormHidden => {
                    bail!("Podcast form was not submitted")
                }
            }
        }

        AdminCommand::AddFromRss { rss_url } => {
            let podcast = api
                .create_podcast_from_rss(&rss_url)
                .await
                .context("Failed to add podcast from RSS feed")?;
            print_podcast(&podcast);
        }

        AdminCommand::Toggle { id } => {
            panel.load().await;
            match panel.toggle_status(id).await {
                ToggleOutcome::Toggled(podcast) => print_podcast(&podcast),
                ToggleOutcome::Failed(e) => {
                    return Err(e).context(format!("Failed to update podcast {id}"));
                }
                ToggleOutcome::UnknownPodcast => bail!("No podcast with id {id}"),
                ToggleOutcome::AlreadyPending => bail!("Podcast {id} is already being updated"),
            }
        }

        AdminCommand::Update {
            id,
            name,
            description,
            rss_url,
            cover_image_url,
            active,
        } => {
            let update = PodcastUpdate {
                name,
                description,
                rss_url,
                cover_image_url,
                is_active: active,
            };
            if update.is_empty() {
                bail!("Nothing to update; pass at least one field");
            }

            let podcast = api
                .update_podcast(id, &update)
                .await
                .with_context(|| format!("Failed to update podcast {id}"))?;
            print_podcast(&podcast);
        }

        AdminCommand::Delete { id } => {
            panel
                .delete(id)
                .await
                .with_context(|| format!("Failed to delete podcast {id}"))?;
            println!("{SUCCESS}Deleted podcast {}", id.to_string().cyan());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing();

    let config = ApiConfig::new(&args.api_url).context("Invalid API configuration")?;
    let api = ApiClient::new(ReqwestClient::new(), config);

    let spinner = Arc::new(SpinnerReporter::new());
    let reporter: SharedProgressReporter = if args.quiet {
        NoopReporter::shared()
    } else {
        // stdout carries command output only
        eprintln!(
            "\n{}{} {}",
            MICROPHONE,
            "poddigest".bold().magenta(),
            "- Podcast Digest".dimmed()
        );
        spinner.clone() as SharedProgressReporter
    };

    let result = match args.command {
        Command::Podcasts { html } => {
            show_grid(&api, &reporter, html).await;
            Ok(())
        }

        Command::Subscribe {
            email,
            name,
            utm_source,
            utm_medium,
        } => {
            let form = SubscribeForm::new(api, reporter).with_utm(utm_source, utm_medium);
            form.set_email(email);
            form.set_name(name.unwrap_or_default());

            match form.submit().await {
                SubscribeStatus::Success(message) => {
                    spinner.finish();
                    println!("{SUCCESS}{}", message.green());
                    Ok(())
                }
                SubscribeStatus::Error(message) => {
                    spinner.finish();
                    Err(anyhow::anyhow!("{FAILURE}{message}"))
                }
                SubscribeStatus::Idle | SubscribeStatus::Loading => Ok(()),
            }
        }

        Command::Open { location } => match Route::from_fragment(&location) {
            Route::Admin => run_admin(api, reporter, AdminCommand::List).await,
            Route::Home => {
                show_grid(&api, &reporter, false).await;
                Ok(())
            }
        },

        Command::Admin { command } => run_admin(api, reporter, command).await,

        Command::Health => {
            let health = api
                .newsletter_health()
                .await
                .context("Failed to reach the newsletter service")?;
            let configured = if health.beehiiv_configured {
                "configured".green()
            } else {
                "not configured".red()
            };
            println!(
                "{MAIL}{} is {} (subscriptions {})",
                health.service.bold(),
                health.status.cyan(),
                configured
            );
            Ok(())
        }
    };

    spinner.finish();
    result
}
