use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feedback_client::{
    controller::{
        auth::{AuthController, AuthState},
        listing::{CommentState, FetchState, ListingController},
        submission::{SubmissionController, SubmissionState},
    },
    load_settings,
    validation::fields,
    ControllerContext, HttpFeedbackApi, JsonFileKeyValueStore, NotificationChannel, PageSize,
    SessionStore, SignUpFields,
};
use shared::domain::{Category, FeedbackId};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "feedback", about = "Sign in, submit and browse feedback")]
struct Cli {
    /// Overrides the configured service address.
    #[arg(long, global = true)]
    server_url: Option<String>,
    /// Where the session token and user id are kept between runs.
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,
    /// Settings file; defaults to ./feedback.toml when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    SignIn {
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    SignUp {
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    SignOut,
    Submit {
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        /// One of the labels printed by `categories`.
        #[arg(long, default_value = "")]
        category: String,
    },
    List {
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long, default_value = "10")]
        page_size: PageSize,
    },
    Comment {
        #[arg(long)]
        feedback_id: i64,
        #[arg(long, default_value = "")]
        comment: String,
        /// Replaces the author name shown in the comment form.
        #[arg(long)]
        username: Option<String>,
        /// Replaces the date shown in the comment form.
        #[arg(long)]
        date: Option<String>,
    },
    Categories,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(url) = cli.server_url {
        settings.server_url = url;
    }
    if let Some(path) = cli.session_file {
        settings.session_path = Some(path);
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let session = match &settings.session_path {
        Some(path) => {
            let store = JsonFileKeyValueStore::open(path)
                .with_context(|| format!("opening session file {}", path.display()))?;
            SessionStore::new(Box::new(store))
        }
        None => SessionStore::in_memory(),
    };
    let base_url = settings.server_url()?;
    debug!(server_url = %base_url, timeout = ?settings.request_timeout(), "client configured");
    let api = HttpFeedbackApi::new(base_url, settings.request_timeout())?;
    let ctx = ControllerContext::new(session, Arc::new(api), Arc::new(NotificationChannel::new()));

    let ok = run(cli.command, &ctx).await;
    render::notices(&ctx.notifications).await;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Runs one command and reports whether its workflow ended successfully.
async fn run(command: Command, ctx: &ControllerContext) -> bool {
    match command {
        Command::SignIn { email, password } => {
            let mut auth = AuthController::new(ctx.clone());
            let next = auth.sign_in(&email, &password).await;
            render::field_errors(auth.sign_in_form().errors());
            render::navigation(next);
            matches!(auth.state(), AuthState::Success(_))
        }
        Command::SignUp {
            first_name,
            last_name,
            email,
            password,
        } => {
            let mut auth = AuthController::new(ctx.clone());
            let next = auth
                .sign_up(SignUpFields {
                    first_name,
                    last_name,
                    email,
                    password,
                })
                .await;
            render::field_errors(auth.sign_up_form().errors());
            render::navigation(next);
            matches!(auth.state(), AuthState::Success(_))
        }
        Command::SignOut => {
            let mut auth = AuthController::new(ctx.clone());
            let next = auth.sign_out().await;
            if auth.state() == AuthState::Idle {
                println!("No stored session; nothing to sign out.");
            }
            render::navigation(next);
            !matches!(auth.state(), AuthState::Failed { .. })
        }
        Command::Submit {
            title,
            description,
            category,
        } => {
            let mut submission = SubmissionController::new(ctx.clone());
            submission.edit(fields::TITLE.name, title);
            submission.edit(fields::DESCRIPTION.name, description);
            submission.edit(fields::CATEGORY.name, category);
            let next = submission.submit().await;
            render::field_errors(submission.form().errors());
            if let Some(rating) = submission.last_rating() {
                info!(rating, "rating attached to submission");
            }
            render::navigation(next);
            submission.state() == SubmissionState::Success
        }
        Command::List { page, page_size } => {
            let mut listing = ListingController::new(ctx.clone());
            listing.fetch().await;
            listing.set_page_size(page_size);
            listing.set_page(page);
            render::listing(&listing);
            !matches!(listing.fetch_state(), FetchState::Failed(_))
        }
        Command::Comment {
            feedback_id,
            comment,
            username,
            date,
        } => {
            let mut listing = ListingController::new(ctx.clone());
            listing.fetch().await;
            if !listing.select_feedback(FeedbackId(feedback_id)) {
                println!("Feedback {feedback_id} is not in the list.");
                return false;
            }
            if let Some(username) = username {
                listing.edit_comment_field(fields::USERNAME.name, username);
            }
            if let Some(date) = date {
                listing.edit_comment_field(fields::DATE.name, date);
            }
            listing.edit_comment_field(fields::COMMENT.name, comment);
            listing.submit_comment().await;
            render::field_errors(listing.comment_errors());
            listing.last_comment_outcome() == Some(CommentState::Success)
        }
        Command::Categories => {
            for category in Category::ALL {
                println!("{category}");
            }
            true
        }
    }
}
