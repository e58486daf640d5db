//! Pure like transforms over an item list.
//!
//! Each function takes the current list and returns a new one; only the
//! target item changes, every other item is cloned through untouched.

use celeste_types::{Likeable, ServerLikes, ViewerId};

/// Pre-update like state of one item, captured before an optimistic change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeSnapshot {
    pub item_id: String,
    pub was_liked: bool,
    pub likes: Vec<ViewerId>,
    pub like_stat: Option<u64>,
}

/// `viewer ∈ item.likes`
pub fn is_liked<T: Likeable>(item: &T, viewer: &str) -> bool {
    !viewer.is_empty() && item.is_liked_by(viewer)
}

/// Flip `viewer`'s like on `item_id`.
///
/// Returns `None` when the item is not in the list. A like never adds a
/// second copy of the viewer and an unlike removes every copy, so `likes`
/// stays duplicate-free.
pub fn toggle_likes<T: Likeable>(
    items: &[T],
    item_id: &str,
    viewer: &str,
) -> Option<(Vec<T>, LikeSnapshot)> {
    let target = items.iter().find(|item| item.item_id() == item_id)?;
    let snapshot = LikeSnapshot {
        item_id: item_id.to_string(),
        was_liked: target.is_liked_by(viewer),
        likes: target.likes().to_vec(),
        like_stat: target.like_stat(),
    };

    let updated = map_item(items, item_id, |item| {
        if snapshot.was_liked {
            item.likes_mut().retain(|id| id != viewer);
            if let Some(stat) = item.like_stat_mut() {
                *stat = stat.saturating_sub(1);
            }
        } else {
            item.likes_mut().push(viewer.to_string());
            if let Some(stat) = item.like_stat_mut() {
                *stat += 1;
            }
        }
    });

    Some((updated, snapshot))
}

/// Put the item's likes (and like counter) back to exactly what `snapshot` holds
pub fn restore_likes<T: Likeable>(items: &[T], snapshot: &LikeSnapshot) -> Vec<T> {
    map_item(items, &snapshot.item_id, |item| {
        *item.likes_mut() = snapshot.likes.clone();
        if let (Some(stat), Some(original)) = (item.like_stat_mut(), snapshot.like_stat) {
            *stat = original;
        }
    })
}

/// Overwrite the optimistic value with the server's answer
pub fn apply_server_likes<T: Likeable>(items: &[T], item_id: &str, server: &ServerLikes) -> Vec<T> {
    let likes = dedup_preserving_order(&server.likes);
    map_item(items, item_id, |item| {
        *item.likes_mut() = likes.clone();
        if let (Some(stat), Some(count)) = (item.server_stat_mut(), server.like_count) {
            *stat = count;
        }
    })
}

fn map_item<T: Likeable>(items: &[T], item_id: &str, mut change: impl FnMut(&mut T)) -> Vec<T> {
    items
        .iter()
        .map(|item| {
            let mut item = item.clone();
            if item.item_id() == item_id {
                change(&mut item);
            }
            item
        })
        .collect()
}

fn dedup_preserving_order(likes: &[ViewerId]) -> Vec<ViewerId> {
    let mut seen = std::collections::HashSet::new();
    likes
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
