//! Top-level facade wiring store, runtime, and social triggers
//!
//! `Storyhive` owns one document store and one trigger runtime with the
//! follow counter triggers registered, plus the service objects the client
//! application goes through. Opening it is the whole deployment story for an
//! embedded backend.

use std::sync::Arc;
use storyhive_core::{Result, StoryId, UserId};
use storyhive_social::{
    schema, CounterConfig, EngagementService, FollowService, OnFollowCreated, OnFollowDeleted,
    ReconcileReport,
};
use storyhive_store::{DocumentStore, StoreStats};
use storyhive_triggers::{DeliveryConfig, RuntimeStats, Trigger, TriggerRuntime};
use tracing::info;

/// Configuration for a storyhive instance
#[derive(Debug, Clone, Default)]
pub struct StoryhiveConfig {
    /// Event delivery and redelivery behavior
    pub delivery: DeliveryConfig,
    /// Counter application mode for the follow triggers
    pub counters: CounterConfig,
}

impl StoryhiveConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the delivery configuration
    pub fn with_delivery(mut self, delivery: DeliveryConfig) -> Self {
        self.delivery = delivery;
        self
    }

    /// Replace the counter configuration
    pub fn with_counters(mut self, counters: CounterConfig) -> Self {
        self.counters = counters;
        self
    }
}

/// An embedded storytelling backend: document store + trigger runtime
pub struct Storyhive {
    store: DocumentStore,
    runtime: Arc<TriggerRuntime>,
    follows: FollowService,
    engagement: EngagementService,
    shut_down: std::sync::atomic::AtomicBool,
}

impl Storyhive {
    /// Open an instance with the given configuration
    pub fn open(config: StoryhiveConfig) -> Self {
        let store = DocumentStore::new();
        let triggers: Vec<Arc<dyn Trigger>> = vec![
            Arc::new(OnFollowCreated::new(config.counters)),
            Arc::new(OnFollowDeleted::new(config.counters)),
        ];
        let runtime = TriggerRuntime::start(store.clone(), config.delivery, triggers);
        store.attach_sink(runtime.clone());
        info!(mode = ?config.counters.mode, "storyhive opened");

        Self {
            follows: FollowService::new(store.clone()),
            engagement: EngagementService::new(store.clone()),
            store,
            runtime,
            shut_down: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Open an instance with default configuration
    pub fn ephemeral() -> Self {
        Self::open(StoryhiveConfig::default())
    }

    // =========================================================================
    // Account and story writes
    // =========================================================================

    /// Create the user document written at sign-up
    ///
    /// Returns `true` when the account document came into existence; an
    /// existing id is overwritten in place (identity is guaranteed upstream
    /// by the auth provider) and returns `false`.
    pub fn create_user(&self, uid: &UserId, username: &str, email: &str) -> Result<bool> {
        let path = schema::user_path(uid.as_str())?;
        Ok(self
            .store
            .set(&path, schema::new_user_fields(uid, username, email)))
    }

    /// Publish a story document
    pub fn publish_story(
        &self,
        author: &UserId,
        story: &StoryId,
        title: &str,
        content: &str,
        thumbnail_url: Option<&str>,
    ) -> Result<bool> {
        let author_path = schema::user_path(author.as_str())?;
        if !self.store.exists(&author_path) {
            return Err(storyhive_core::Error::DocumentNotFound(author_path));
        }
        let path = schema::story_path(story.as_str())?;
        Ok(self
            .store
            .set(&path, schema::new_story_fields(author, title, content, thumbnail_url)))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The underlying document store
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// The trigger runtime
    pub fn runtime(&self) -> &Arc<TriggerRuntime> {
        &self.runtime
    }

    /// Follow/unfollow operations
    pub fn follows(&self) -> &FollowService {
        &self.follows
    }

    /// Likes, saves, ratings, comments
    pub fn engagement(&self) -> &EngagementService {
        &self.engagement
    }

    /// Recompute counters from the edge set and repair drift
    pub fn reconcile(&self) -> Result<ReconcileReport> {
        storyhive_social::reconcile_counters(&self.store)
    }

    /// Block until every published event has been handled
    pub fn drain(&self) {
        self.runtime.drain();
    }

    /// Stop delivering events and join the worker threads
    pub fn shutdown(&self) {
        if !self
            .shut_down
            .swap(true, std::sync::atomic::Ordering::SeqCst)
        {
            self.runtime.shutdown();
        }
    }

    /// Store metrics snapshot
    pub fn store_stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Runtime metrics snapshot
    pub fn runtime_stats(&self) -> RuntimeStats {
        self.runtime.stats()
    }
}

impl Drop for Storyhive {
    fn drop(&mut self) {
        self.shutdown();
    }
}
