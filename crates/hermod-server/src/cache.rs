/*
 * Copyright (c) 2025 Hermod Contributors
 * Licensed under the MIT License.
 * See LICENSE file in the project root for full license text.
 */

//! Read-through subscription cache.
//!
//! Keeps the delivery hot path off the database: workers resolve
//! subscriptions through this cache, which stores opaque serialized
//! snapshots with a short TTL. Mutating API handlers invalidate the entry;
//! a missed invalidation is repaired within one TTL, and the worker
//! tolerates that window of staleness.

use crate::dal::DAL;
use hermod_models::models::subscriptions::Subscription;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// The cached view of a subscription: just what delivery needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSnapshot {
    pub id: i64,
    pub target_url: String,
    pub secret: String,
    pub event_types: Vec<String>,
    pub is_active: bool,
}

impl From<&Subscription> for SubscriptionSnapshot {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id,
            target_url: subscription.target_url.clone(),
            secret: subscription.secret.clone(),
            event_types: subscription
                .event_types
                .iter()
                .flatten()
                .cloned()
                .collect(),
            is_active: subscription.is_active,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Shared TTL cache of subscription snapshots keyed by subscription ID.
#[derive(Clone)]
pub struct SubscriptionCache {
    entries: Arc<RwLock<HashMap<i64, Entry>>>,
    ttl: Duration,
}

impl SubscriptionCache {
    /// Creates a cache whose entries expire after `ttl_seconds`.
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    /// Read-through lookup: serves a live cached snapshot, otherwise fetches
    /// from the database and caches the result.
    pub async fn get(
        &self,
        dal: &DAL,
        id: i64,
    ) -> Result<Option<SubscriptionSnapshot>, diesel::result::Error> {
        if let Some(snapshot) = self.lookup(id).await {
            return Ok(Some(snapshot));
        }

        match dal.subscriptions().get(id)? {
            Some(subscription) => {
                let snapshot = SubscriptionSnapshot::from(&subscription);
                self.store(&snapshot).await;
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    /// Cache-only lookup; returns `None` for missing or expired entries.
    pub async fn lookup(&self, id: i64) -> Option<SubscriptionSnapshot> {
        let entries = self.entries.read().await;
        match entries.get(&id) {
            Some(entry) if !entry.is_expired() => serde_json::from_str(&entry.value).ok(),
            _ => None,
        }
    }

    /// Stores a snapshot with the configured TTL.
    pub async fn store(&self, snapshot: &SubscriptionSnapshot) {
        if let Ok(value) = serde_json::to_string(snapshot) {
            let mut entries = self.entries.write().await;
            entries.insert(
                snapshot.id,
                Entry {
                    value,
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }
    }

    /// Removes an entry. Called on every subscription mutation.
    pub async fn invalidate(&self, id: i64) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(&id).is_some()
    }

    /// Number of live (non-expired) entries.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.values().filter(|e| !e.is_expired()).count()
    }

    /// Whether the cache holds no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
