use crate::enums::ItemKind;
use crate::models::{Comment, Post, ViewerId};

/// Capability shared by every item a viewer can like.
///
/// Posts and comments both carry an identifier and a `likes` list of viewer
/// handles; the like coordinator is generic over this trait instead of being
/// written once per entity.
pub trait Likeable: Clone + Send + Sync + 'static {
    const KIND: ItemKind;

    fn item_id(&self) -> &str;

    fn likes(&self) -> &[ViewerId];

    fn likes_mut(&mut self) -> &mut Vec<ViewerId>;

    /// Denormalized like counter that moves together with `likes`, if the
    /// item keeps one in step. Items whose counters are maintained elsewhere
    /// return `None`.
    fn like_stat_mut(&mut self) -> Option<&mut u64> {
        None
    }

    fn like_stat(&self) -> Option<u64> {
        None
    }

    /// Counter the server's reported like count is written to. Defaults to
    /// `like_stat_mut`; posts override it so server counts land in
    /// `stats.likes` even though optimistic toggles leave that field alone.
    fn server_stat_mut(&mut self) -> Option<&mut u64> {
        self.like_stat_mut()
    }

    fn is_liked_by(&self, viewer: &str) -> bool {
        self.likes().iter().any(|id| id == viewer)
    }
}

impl Likeable for Post {
    const KIND: ItemKind = ItemKind::Post;

    fn item_id(&self) -> &str {
        &self.id
    }

    fn likes(&self) -> &[ViewerId] {
        &self.likes
    }

    fn likes_mut(&mut self) -> &mut Vec<ViewerId> {
        &mut self.likes
    }

    fn server_stat_mut(&mut self) -> Option<&mut u64> {
        Some(&mut self.stats.likes)
    }
}

impl Likeable for Comment {
    const KIND: ItemKind = ItemKind::Comment;

    fn item_id(&self) -> &str {
        &self.id
    }

    fn likes(&self) -> &[ViewerId] {
        &self.likes
    }

    fn likes_mut(&mut self) -> &mut Vec<ViewerId> {
        &mut self.likes
    }

    fn like_stat_mut(&mut self) -> Option<&mut u64> {
        self.stats.as_mut().map(|stats| &mut stats.likes)
    }

    fn like_stat(&self) -> Option<u64> {
        self.stats.map(|stats| stats.likes)
    }
}
