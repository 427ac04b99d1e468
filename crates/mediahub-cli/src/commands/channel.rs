//! Channel page and watch history commands.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use mediahub_core::error::AppError;
use mediahub_core::types::AccountId;
use mediahub_entity::{ChannelProfile, WatchHistoryEntry};

use super::Services;
use super::session::TokenArgs;
use crate::output::{self, OutputFormat};

/// Arguments for `channel`
#[derive(Debug, Args)]
pub struct ChannelArgs {
    /// Channel username
    pub username: String,
    /// Access token of the viewer; anonymous if omitted
    #[arg(long)]
    pub access_token: Option<String>,
}

/// Arguments for `subscribe` and `unsubscribe`
#[derive(Debug, Args)]
pub struct SubscriptionArgs {
    /// Channel username
    pub username: String,
    /// Access token of the subscriber
    #[arg(long)]
    pub access_token: String,
}

/// Channel display row for table output
#[derive(Debug, Serialize, Tabled)]
struct ChannelRow {
    /// Username
    username: String,
    /// Full name
    full_name: String,
    /// Subscribers
    subscribers: u64,
    /// Subscribed to
    subscribed_to: u64,
    /// Whether the viewer subscribes
    subscribed: bool,
}

impl From<&ChannelProfile> for ChannelRow {
    fn from(profile: &ChannelProfile) -> Self {
        Self {
            username: profile.username.clone(),
            full_name: profile.full_name.clone(),
            subscribers: profile.subscribers_count,
            subscribed_to: profile.channel_subscribed_to_count,
            subscribed: profile.is_subscribed,
        }
    }
}

/// Watch history row for table output
#[derive(Debug, Serialize, Tabled)]
struct HistoryRow {
    /// Position in watch order
    #[tabled(rename = "#")]
    position: usize,
    /// Media title
    title: String,
    /// Owner username
    owner: String,
    /// Duration in seconds
    duration: String,
    /// Views
    views: i64,
}

/// Execute `channel`
pub async fn profile(
    args: &ChannelArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let viewer = match &args.access_token {
        Some(token) => Some(services.sessions.authenticate(token).await?.id),
        None => None,
    };
    let profile = services
        .aggregator
        .channel_profile(&args.username, viewer)
        .await?;

    match format {
        OutputFormat::Json => output::print_fields(&profile, format),
        OutputFormat::Table => output::print_item(&ChannelRow::from(&profile), format),
    }
    Ok(())
}

/// Execute `subscribe`
pub async fn subscribe(args: &SubscriptionArgs, services: &Services) -> Result<(), AppError> {
    let (subscriber, channel) = resolve_edge(args, services).await?;
    if subscriber == channel.id {
        return Err(AppError::validation("Cannot subscribe to your own channel"));
    }

    if services.relations.subscribe(subscriber, channel.id).await? {
        output::print_success(&format!("Subscribed to '{}'", channel.username));
    } else {
        output::print_warning(&format!("Already subscribed to '{}'", channel.username));
    }
    Ok(())
}

/// Execute `unsubscribe`
pub async fn unsubscribe(args: &SubscriptionArgs, services: &Services) -> Result<(), AppError> {
    let (subscriber, channel) = resolve_edge(args, services).await?;

    if services.relations.unsubscribe(subscriber, channel.id).await? {
        output::print_success(&format!("Unsubscribed from '{}'", channel.username));
    } else {
        output::print_warning(&format!("Not subscribed to '{}'", channel.username));
    }
    Ok(())
}

async fn resolve_edge(
    args: &SubscriptionArgs,
    services: &Services,
) -> Result<(AccountId, ChannelProfile), AppError> {
    let subscriber = services.sessions.authenticate(&args.access_token).await?.id;
    let channel = services
        .aggregator
        .channel_profile(&args.username, Some(subscriber))
        .await?;
    Ok((subscriber, channel))
}

/// Execute `history`
pub async fn history(
    args: &TokenArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let account = services.sessions.authenticate(&args.access_token).await?;
    let entries = services.aggregator.watch_history(account.id).await?;

    match format {
        OutputFormat::Json => output::print_fields(&entries, format),
        OutputFormat::Table => output::print_list(&history_rows(&entries), format),
    }
    Ok(())
}

fn history_rows(entries: &[WatchHistoryEntry]) -> Vec<HistoryRow> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| HistoryRow {
            position: index + 1,
            title: entry.media.title.clone(),
            owner: entry
                .owner
                .as_ref()
                .map(|owner| owner.username.clone())
                .unwrap_or_else(|| "-".to_string()),
            duration: format!("{:.0}", entry.media.duration_seconds),
            views: entry.media.views,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediahub_core::types::MediaId;
    use mediahub_entity::MediaItem;

    #[test]
    fn test_history_rows_mark_missing_owner() {
        let entry = WatchHistoryEntry {
            media: MediaItem {
                id: MediaId::new(),
                owner_id: AccountId::new(),
                title: "clip".into(),
                description: String::new(),
                video_url: "https://cdn.example.com/clip.mp4".into(),
                thumbnail_url: "https://cdn.example.com/clip.jpg".into(),
                duration_seconds: 59.6,
                views: 4,
                is_published: true,
                created_at: Default::default(),
            },
            owner: None,
        };

        let rows = history_rows(&[entry]);
        assert_eq!(rows[0].position, 1);
        assert_eq!(rows[0].owner, "-");
        assert_eq!(rows[0].duration, "60");
    }
}
