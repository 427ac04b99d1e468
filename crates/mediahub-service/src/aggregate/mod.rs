//! Relationship read models.
//!
//! [`channel_profile`] and [`watch_history`] are pure functions over
//! relations already loaded into memory; [`AggregatorService`] loads those
//! relations from the store and calls them. Nothing here writes.

pub mod service;

pub use service::AggregatorService;

use std::collections::HashMap;

use mediahub_core::error::AppError;
use mediahub_core::result::AppResult;
use mediahub_core::types::{AccountId, MediaId};
use mediahub_entity::{
    Account, ChannelProfile, MediaItem, OwnerSummary, Subscription, WatchHistoryEntry,
};

/// Builds the channel page for `channel`.
///
/// `edges_to` are the edges whose channel is `channel`; `edges_by` are the
/// edges whose subscriber is `channel`. An edge from the wrong side means
/// the loader broke its contract and is reported as an internal error.
pub fn channel_profile(
    channel: &Account,
    edges_to: &[Subscription],
    edges_by: &[Subscription],
    viewer: Option<AccountId>,
) -> AppResult<ChannelProfile> {
    if edges_to.iter().any(|edge| edge.channel_id != channel.id)
        || edges_by.iter().any(|edge| edge.subscriber_id != channel.id)
    {
        return Err(AppError::internal(
            "Subscription edges do not belong to the requested channel",
        ));
    }

    let is_subscribed =
        viewer.is_some_and(|viewer| edges_to.iter().any(|edge| edge.subscriber_id == viewer));

    Ok(ChannelProfile {
        id: channel.id,
        full_name: channel.full_name.clone(),
        username: channel.username.clone(),
        email: channel.email.clone(),
        avatar: channel.avatar.clone(),
        cover_image: channel.cover_image.clone(),
        subscribers_count: edges_to.len() as u64,
        channel_subscribed_to_count: edges_by.len() as u64,
        is_subscribed,
    })
}

/// Resolves `watched` into media records with their owners attached.
///
/// Output order follows `watched`, one entry per occurrence. Ids with no
/// media record are skipped; media whose owner is missing get `owner: None`.
/// If the same id appears more than once in `media` or `owners`, the first
/// one wins.
pub fn watch_history(
    watched: &[MediaId],
    media: &[MediaItem],
    owners: &[Account],
) -> Vec<WatchHistoryEntry> {
    let mut media_by_id: HashMap<MediaId, &MediaItem> = HashMap::with_capacity(media.len());
    for item in media {
        media_by_id.entry(item.id).or_insert(item);
    }

    let mut owner_by_id: HashMap<AccountId, OwnerSummary> = HashMap::with_capacity(owners.len());
    for owner in owners {
        owner_by_id
            .entry(owner.id)
            .or_insert_with(|| OwnerSummary::from(owner));
    }

    watched
        .iter()
        .filter_map(|id| media_by_id.get(id))
        .map(|item| WatchHistoryEntry {
            media: (*item).clone(),
            owner: owner_by_id.get(&item.owner_id).cloned(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mediahub_core::error::ErrorKind;
    use mediahub_entity::PasswordHash;

    fn account(username: &str) -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(),
            username: username.into(),
            email: format!("{username}@example.com"),
            full_name: username.to_uppercase(),
            avatar: Some(format!("https://cdn.example.com/{username}.png")),
            cover_image: None,
            password_hash: PasswordHash::from_phc("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA"),
            refresh_token: Some("live-refresh-token".into()),
            watch_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn media(owner: &Account, title: &str) -> MediaItem {
        MediaItem {
            id: MediaId::new(),
            owner_id: owner.id,
            title: title.into(),
            description: String::new(),
            video_url: format!("https://cdn.example.com/{title}.mp4"),
            thumbnail_url: format!("https://cdn.example.com/{title}.jpg"),
            duration_seconds: 60.0,
            views: 0,
            is_published: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_channel_counts_and_subscription_flag() {
        let (a, b, c, d) = (account("a"), account("b"), account("c"), account("d"));
        let to_c = vec![Subscription::new(a.id, c.id), Subscription::new(b.id, c.id)];
        let by_c = vec![Subscription::new(c.id, d.id)];

        let as_d = channel_profile(&c, &to_c, &by_c, Some(d.id)).unwrap();
        assert_eq!(as_d.subscribers_count, 2);
        assert_eq!(as_d.channel_subscribed_to_count, 1);
        assert!(!as_d.is_subscribed);

        let as_a = channel_profile(&c, &to_c, &by_c, Some(a.id)).unwrap();
        assert!(as_a.is_subscribed);

        let anonymous = channel_profile(&c, &to_c, &by_c, None).unwrap();
        assert!(!anonymous.is_subscribed);
    }

    #[test]
    fn test_channel_without_edges() {
        let c = account("c");
        let profile = channel_profile(&c, &[], &[], None).unwrap();
        assert_eq!(profile.subscribers_count, 0);
        assert_eq!(profile.channel_subscribed_to_count, 0);
    }

    #[test]
    fn test_foreign_edges_are_internal() {
        let (a, b, c) = (account("a"), account("b"), account("c"));
        let wrong = vec![Subscription::new(a.id, b.id)];
        let err = channel_profile(&c, &wrong, &[], None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn test_history_follows_watch_order() {
        let owner = account("owner");
        let (m1, m2, m3) = (media(&owner, "m1"), media(&owner, "m2"), media(&owner, "m3"));
        let watched = vec![m3.id, m1.id, m2.id, m3.id];
        let loaded = vec![m1.clone(), m2.clone(), m3.clone()];

        let entries = watch_history(&watched, &loaded, std::slice::from_ref(&owner));
        let titles: Vec<_> = entries.iter().map(|e| e.media.title.as_str()).collect();
        assert_eq!(titles, ["m3", "m1", "m2", "m3"]);
        assert!(entries.iter().all(|e| e.owner.as_ref().unwrap().username == "owner"));
    }

    #[test]
    fn test_history_tolerates_missing_rows() {
        let owner = account("owner");
        let gone = account("gone");
        let kept = media(&owner, "kept");
        let orphan = media(&gone, "orphan");
        let watched = vec![MediaId::new(), kept.id, orphan.id];

        let entries = watch_history(&watched, &[kept, orphan], &[owner]);
        assert_eq!(entries.len(), 2);
        assert!(entries[0].owner.is_some());
        assert!(entries[1].owner.is_none());

        assert!(watch_history(&[], &[], &[]).is_empty());
    }

    #[test]
    fn test_history_never_exposes_secrets() {
        let owner = account("owner");
        let item = media(&owner, "clip");
        let entries = watch_history(&[item.id], &[item], &[owner]);
        let json = serde_json::to_string(&entries).unwrap();
        assert!(!json.contains("live-refresh-token"));
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("owner@example.com"));
    }
}
