use std::sync::{Arc, Mutex};

use celeste_types::Post;

use crate::api::InteractionApi;
use crate::interaction::{Notice, NoticeSink};

/// Case-insensitive match on content, author username and author handle.
/// A blank query matches everything.
pub fn filter_posts_locally(posts: &[Post], query: &str) -> Vec<Post> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return posts.to_vec();
    }

    posts
        .iter()
        .filter(|post| {
            post.content.to_lowercase().contains(&query)
                || post.author.as_ref().is_some_and(|author| {
                    author.username.to_lowercase().contains(&query)
                        || author.handle.to_lowercase().contains(&query)
                })
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Default)]
struct SearchState {
    query: String,
    results: Vec<Post>,
    searching: bool,
    /// Bumped by every `search` call; only the latest call may write results
    generation: u64,
}

/// Post search backed by the server, falling back to filtering the posts
/// already on screen when the server search fails
pub struct PostSearch {
    api: Arc<dyn InteractionApi>,
    notices: Arc<dyn NoticeSink>,
    initial: Mutex<Vec<Post>>,
    state: Mutex<SearchState>,
}

impl PostSearch {
    pub fn new(api: Arc<dyn InteractionApi>, notices: Arc<dyn NoticeSink>, posts: Vec<Post>) -> Self {
        Self {
            api,
            notices,
            initial: Mutex::new(posts.clone()),
            state: Mutex::new(SearchState {
                results: posts,
                ..SearchState::default()
            }),
        }
    }

    /// New on-screen posts. Shown directly while no query is active.
    pub fn set_posts(&self, posts: Vec<Post>) {
        let mut state = self.lock_state();
        if state.query.trim().is_empty() {
            state.results = posts.clone();
        }
        *self.initial.lock().unwrap_or_else(|e| e.into_inner()) = posts;
    }

    pub fn results(&self) -> Vec<Post> {
        self.lock_state().results.clone()
    }

    pub fn query(&self) -> String {
        self.lock_state().query.clone()
    }

    pub fn is_searching(&self) -> bool {
        self.lock_state().searching
    }

    /// Run `query` and return its results. They become the current results
    /// only if no newer search or reset started while this one was pending.
    pub async fn search(&self, query: &str) -> Vec<Post> {
        let initial = self.initial.lock().unwrap_or_else(|e| e.into_inner()).clone();
        let generation = {
            let mut state = self.lock_state();
            state.generation += 1;
            state.query = query.to_string();
            if query.trim().is_empty() {
                state.results = initial;
                state.searching = false;
                return state.results.clone();
            }
            state.searching = true;
            state.generation
        };

        let results = match self.api.search_posts(query.trim()).await {
            Ok(posts) => posts,
            Err(e) => {
                log::warn!("search for {:?} failed, using local results: {}", query, e);
                self.notices
                    .notify(Notice::warning("Search failed, showing local results"));
                filter_posts_locally(&initial, query)
            }
        };

        let mut state = self.lock_state();
        if state.generation == generation {
            state.results = results.clone();
            state.searching = false;
        } else {
            log_debug!("search for {:?} superseded, response dropped", query);
        }
        results
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
