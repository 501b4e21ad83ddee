//! A bounded arena of in-progress builder sessions.
//!
//! Sessions are keyed by their recipe id. Each one sits behind its own
//! async mutex so two concurrent requests against the same session (say,
//! two `specify` calls) cannot interleave partial state updates. The arena
//! is bounded: abandoned sessions would otherwise accumulate forever, so
//! once the bound is reached the oldest session is evicted.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use ladle_core::builder::RecipeBuilder;

type SharedBuilder = Arc<tokio::sync::Mutex<RecipeBuilder>>;

pub struct SessionArena {
    max_sessions: usize,
    inner: Mutex<ArenaInner>,
}

struct ArenaInner {
    builders: HashMap<String, SharedBuilder>,
    // insertion order, oldest first
    order: VecDeque<String>,
}

impl SessionArena {
    pub fn new(max_sessions: usize) -> Self {
        assert!(max_sessions > 0, "session arena needs room for one session");
        Self {
            max_sessions,
            inner: Mutex::new(ArenaInner {
                builders: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Stores a new builder under its id, evicting the oldest session if
    /// the arena is full. Returns the session id.
    pub fn insert(&self, builder: RecipeBuilder) -> String {
        let id = builder.id().to_string();
        let mut inner = self.inner.lock().expect("session arena lock poisoned");
        while inner.order.len() >= self.max_sessions {
            if let Some(evicted) = inner.order.pop_front() {
                inner.builders.remove(&evicted);
                tracing::warn!(session = %evicted, "evicted oldest builder session");
            }
        }
        inner.builders.insert(id.clone(), Arc::new(tokio::sync::Mutex::new(builder)));
        inner.order.push_back(id.clone());
        id
    }

    pub fn get(&self, id: &str) -> Option<SharedBuilder> {
        self.inner
            .lock()
            .expect("session arena lock poisoned")
            .builders
            .get(id)
            .cloned()
    }

    /// Drops a session, typically once its recipe has been saved.
    pub fn remove(&self, id: &str) {
        let mut inner = self.inner.lock().expect("session arena lock poisoned");
        if inner.builders.remove(id).is_some() {
            inner.order.retain(|entry| entry != id);
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("session arena lock poisoned")
            .builders
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
