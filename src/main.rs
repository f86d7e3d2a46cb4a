// chatsync CLI: drives the synchronization stores against a chat server.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, LevelFilter};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use chatsync::api::{HttpChatApi, NewConversation};
use chatsync::config::{load_profile, save_profile, Profile};
use chatsync::models::ConversationKind;
use chatsync::store::{ConversationStore, MessageStore};
use chatsync::utils;

/// Command line arguments for chatsync
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "chatsync: a client-side synchronization layer for a chat server."
)]
struct Args {
    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Server base URL, overriding the saved profile
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Prompt for server details and save them as the default profile
    Login,
    /// List conversations visible to the current user
    List,
    /// Create a conversation with the given comma-separated participant ids
    Create {
        participants: String,
        /// Create a group conversation instead of a private one
        #[arg(long)]
        group: bool,
        /// Display name, required for group conversations
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete a conversation by id
    Delete { id: String },
    /// Print a conversation's message history
    History {
        id: String,
        /// How many pages of history to fetch, most recent first
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
}

/// Prompts for server details or takes them from environment variables.
fn prompt_profile() -> Result<Profile> {
    let server = match env::var("CHATSYNC_SERVER") {
        Ok(server) => server,
        Err(_) => {
            eprintln!("Enter server base URL (e.g., https://chat.example.com/api):");
            utils::read_line()?
        }
    };
    if server.is_empty() {
        return Err(anyhow!("Server URL must not be empty"));
    }

    let token = match env::var("CHATSYNC_TOKEN") {
        Ok(token) => token,
        Err(_) => {
            eprintln!("Enter API token (leave empty for none):");
            utils::read_line()?
        }
    };

    let token = if token.is_empty() { None } else { Some(token.as_str()) };
    Ok(Profile::new(&server, token))
}

fn build_api(server_override: Option<String>) -> Result<HttpChatApi> {
    let profile = load_profile()?;
    let server = server_override
        .or_else(|| profile.as_ref().map(|p| p.server.clone()))
        .ok_or_else(|| anyhow!("No server configured; run `chatsync login` or pass --server"))?;

    let mut api = HttpChatApi::new(&server);
    if let Some(token) = profile.as_ref().and_then(|p| p.get_token()) {
        if !token.is_empty() {
            api = api.with_token(&token);
        }
    }
    Ok(api)
}

fn format_timestamp(timestamp: u64) -> String {
    match chrono::DateTime::from_timestamp(timestamp as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

async fn list(api: Arc<HttpChatApi>) -> Result<()> {
    let conversations = ConversationStore::new(api);
    conversations.load().await;
    if let Some(error) = conversations.error().await {
        return Err(anyhow!(error));
    }

    let list = conversations.conversations().await;
    if list.is_empty() {
        println!("No conversations.");
        return Ok(());
    }
    for conversation in list {
        let label = conversation
            .name
            .clone()
            .unwrap_or_else(|| conversation.participant_ids.join(", "));
        println!("{}  [{}] {}", conversation.id, conversation.kind, label);
    }
    Ok(())
}

async fn create(
    api: Arc<HttpChatApi>,
    participants: String,
    group: bool,
    name: Option<String>,
) -> Result<()> {
    let participant_ids: Vec<String> = participants
        .split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();
    let kind = if group {
        ConversationKind::Group
    } else {
        ConversationKind::Private
    };

    let conversations = ConversationStore::new(api);
    let conversation = conversations
        .create(NewConversation {
            kind,
            participant_ids,
            name,
        })
        .await?;
    println!("Created conversation {}", conversation.id);
    Ok(())
}

async fn delete(api: Arc<HttpChatApi>, id: String) -> Result<()> {
    let conversations = ConversationStore::new(api);
    conversations.delete(&id).await?;
    println!("Deleted conversation {}", id);
    Ok(())
}

async fn history(api: Arc<HttpChatApi>, id: String, pages: u32) -> Result<()> {
    let messages = MessageStore::new(api);
    messages.set_conversation(Some(id)).await;

    while messages.current_page().await < pages && messages.has_more().await {
        messages.load_more().await;
        // A failed page keeps the counter where it was; stop instead of
        // re-requesting the same page forever.
        if messages.error().await.is_some() {
            break;
        }
    }
    if let Some(error) = messages.error().await {
        return Err(anyhow!(error));
    }

    let history = messages.messages().await;
    if history.is_empty() {
        println!("No messages.");
        return Ok(());
    }
    if messages.has_more().await {
        println!("(older history available)");
    }
    for message in history {
        let marker = if message.edited { " (edited)" } else { "" };
        println!(
            "[{}] {}: {}{}",
            format_timestamp(message.timestamp),
            message.sender_id,
            message.content,
            marker
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    utils::setup_logging(args.log_file.as_deref(), LevelFilter::Info)?;
    info!("chatsync starting up");

    match args.command {
        Command::Login => {
            let profile = prompt_profile()?;
            save_profile(&profile)?;
            println!("Profile saved for {}", profile.server);
            Ok(())
        }
        Command::List => list(Arc::new(build_api(args.server)?)).await,
        Command::Create {
            participants,
            group,
            name,
        } => create(Arc::new(build_api(args.server)?), participants, group, name).await,
        Command::Delete { id } => delete(Arc::new(build_api(args.server)?), id).await,
        Command::History { id, pages } => {
            history(Arc::new(build_api(args.server)?), id, pages).await
        }
    }
}
