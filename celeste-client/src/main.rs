use std::sync::Arc;

use anyhow::{Context, Result};
use celeste::api::{ApiClient, InteractionApi};
use celeste::config::ConfigManager;
use celeste::interaction::{
    CommentThread, HomeFeed, InteractionError, NoticeLevel, NoticeQueue,
};
use celeste::logging::{init_logging, LogConfig};
use celeste::session::{SessionData, SessionStore, ViewerContext};
use celeste::util::time_format::format_since;
use celeste_types::{Post, Viewer};
use clap::{Parser, Subcommand};

/// CelesteTalk - like, bookmark and comment from the terminal
#[derive(Parser)]
#[command(name = "celeste")]
#[command(about = "Command-line client for CelesteTalk interactions")]
#[command(version)]
struct Cli {
    /// Server URL to connect to
    #[arg(long, short, env = "CELESTE_SERVER_URL")]
    server: Option<String>,

    /// Enable verbose logging
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a session as the given handle
    Login {
        handle: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long, default_value = "")]
        avatar: String,
    },
    /// End the current session
    Logout,
    /// Show the signed-in viewer
    Whoami,
    /// Remember a server URL for future runs
    UseServer { url: String },
    /// Show the home feed
    Feed,
    /// Like or unlike a post from the home feed
    Like { post_id: String },
    /// List the comments on a post
    Comments { post_id: String },
    /// Comment on a post, optionally replying to one of its comments
    Comment {
        post_id: String,
        content: String,
        #[arg(long)]
        reply_to: Option<String>,
    },
    /// Like or unlike a comment on a post
    LikeComment { post_id: String, comment_id: String },
    /// Search posts
    Search { query: String },
}

// Load environment variables from .env file
fn load_env() {
    let _ = dotenv::dotenv();
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::verbose()
    } else {
        LogConfig::default()
    };
    init_logging(&log_config)?;

    let config = ConfigManager::new()?;
    let server_url = config.determine_server_url(cli.server.clone())?;
    let store = SessionStore::new()?;
    let viewer = ViewerContext::anonymous();
    store.restore_into(&viewer)?;

    let mut client = ApiClient::new(server_url);
    if let Some(session) = store.load()? {
        client.set_session_token(session.session_token);
    }
    let api: Arc<dyn InteractionApi> = Arc::new(client);
    let notices = Arc::new(NoticeQueue::new());

    let outcome = run(cli.command, api, &config, &viewer, &store, &notices).await;
    print_notices(&notices);
    outcome
}

async fn run(
    command: Command,
    api: Arc<dyn InteractionApi>,
    config: &ConfigManager,
    viewer: &ViewerContext,
    store: &SessionStore,
    notices: &Arc<NoticeQueue>,
) -> Result<()> {
    match command {
        Command::Login {
            handle,
            username,
            avatar,
        } => {
            let username = username.unwrap_or_else(|| handle.clone());
            let session = SessionData {
                viewer: Viewer::new(handle, username).with_avatar(avatar),
                session_token: None,
            };
            store.save(&session).context("Failed to save session")?;
            viewer.hydrate(session.viewer.clone());
            println!("Signed in as @{}", session.viewer.handle);
        }
        Command::Logout => {
            store.logout(viewer)?;
            println!("Signed out");
        }
        Command::Whoami => match viewer.current() {
            Some(v) => println!("@{} ({})", v.handle, v.username),
            None => println!("Not signed in"),
        },
        Command::UseServer { url } => {
            config
                .save_server_url(url.clone())
                .context("Failed to save server URL")?;
            println!(
                "Using {} (saved in {})",
                url,
                config.config_dir().display()
            );
        }
        Command::Feed => {
            let feed = HomeFeed::new(api, notices.clone());
            if feed.fetch_posts().await.is_ok() {
                let posts = feed.posts();
                if posts.is_empty() {
                    println!("Your feed is empty");
                }
                for post in &posts {
                    print_post(post);
                }
            }
        }
        Command::Like { post_id } => {
            let feed = HomeFeed::new(api, notices.clone());
            if feed.fetch_posts().await.is_err() {
                return Ok(());
            }
            let likes = feed.like_coordinator(viewer.clone());
            match likes.toggle_like(&post_id).await {
                Ok(result) => {
                    let verb = if result.liked { "Liked" } else { "Unliked" };
                    println!("{} {} ({} likes)", verb, post_id, result.likes.len());
                }
                Err(InteractionError::UnknownItem(id)) => {
                    anyhow::bail!("Post {} is not in your home feed", id)
                }
                // Already reported through a notice
                Err(_) => {}
            }
        }
        Command::Comments { post_id } => {
            let thread = CommentThread::new(post_id, api, viewer.clone(), notices.clone());
            if thread.fetch_comments().await.is_ok() {
                print_comments(&thread);
            }
        }
        Command::Comment {
            post_id,
            content,
            reply_to,
        } => {
            let thread = CommentThread::new(post_id, api, viewer.clone(), notices.clone());
            if let Some(target_id) = reply_to {
                thread.fetch_comments().await.ok();
                let target = thread.comments().into_iter().find(|c| c.id == target_id);
                if target.is_none() {
                    anyhow::bail!("No comment {} on this post", target_id);
                }
                thread.open_reply_dialog(target);
            } else {
                thread.open_reply_dialog(None);
            }
            if let Ok(comment) = thread.handle_comment(&content).await {
                println!("Posted comment {}", comment.id);
            }
        }
        Command::LikeComment {
            post_id,
            comment_id,
        } => {
            let thread = CommentThread::new(post_id, api, viewer.clone(), notices.clone());
            thread.fetch_comments().await.ok();
            if let Ok(result) = thread.comment_likes().toggle_like(&comment_id).await {
                let verb = if result.liked { "Liked" } else { "Unliked" };
                println!("{} comment {} ({} likes)", verb, comment_id, result.likes.len());
            }
        }
        Command::Search { query } => {
            let search = celeste::util::search::PostSearch::new(api, notices.clone(), Vec::new());
            for post in search.search(&query).await {
                print_post(&post);
            }
        }
    }
    Ok(())
}

fn print_post(post: &Post) {
    let author = post
        .author
        .as_ref()
        .map(|a| format!("@{}", a.handle))
        .unwrap_or_else(|| post.author_id.clone());
    println!(
        "[{}] {} {}: {} ♥{}",
        post.id,
        format_since(&post.created_at),
        author,
        post.content,
        post.likes.len()
    );
}

fn print_comments(thread: &CommentThread) {
    let comments = thread.comments();
    if comments.is_empty() {
        println!("No comments yet");
        return;
    }
    for comment in comments {
        let author = comment
            .author
            .as_ref()
            .map(|a| format!("@{}", a.handle))
            .unwrap_or_else(|| comment.author_id.clone());
        let reply = comment
            .reply_to
            .as_ref()
            .map(|id| format!(" (reply to {})", id))
            .unwrap_or_default();
        println!(
            "[{}] {} {}{}: {} ♥{}",
            comment.id,
            format_since(&comment.created_at),
            author,
            reply,
            comment.content,
            comment.likes.len()
        );
    }
}

fn print_notices(notices: &NoticeQueue) {
    for notice in notices.drain() {
        match notice.level {
            NoticeLevel::Error | NoticeLevel::Warning => eprintln!("{}", notice.message),
            NoticeLevel::Info | NoticeLevel::Success => println!("{}", notice.message),
        }
    }
}
