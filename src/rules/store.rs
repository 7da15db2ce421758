//! Rule persistence.
//!
//! `RuleStore` is the seam between the repository and whatever keeps the
//! rules. `MemoryRuleStore` keeps them in concurrent maps and can mirror
//! every write to a JSON file so rules survive restarts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rules::model::{NewRule, Rule, RuleKind, RulePatch};

/// Errors raised by a rule store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("rule store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("rule store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Abstract persistent storage for rules.
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Persist a new rule, assigning its id.
    async fn insert(&self, kind: RuleKind, rule: NewRule, now: DateTime<Utc>) -> StoreResult<Rule>;

    /// Every rule of a kind, ordered by id.
    async fn list(&self, kind: RuleKind) -> StoreResult<Vec<Rule>>;

    /// Rules of a kind filed under any of `services`, ordered by id.
    async fn list_for_services(&self, kind: RuleKind, services: &[&str]) -> StoreResult<Vec<Rule>>;

    /// Apply a patch. Unknown ids are ignored.
    async fn update(
        &self,
        kind: RuleKind,
        id: u64,
        patch: RulePatch,
        now: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Remove a rule. Unknown ids are ignored.
    async fn remove(&self, kind: RuleKind, id: u64) -> StoreResult<()>;
}

/// On-disk layout of the JSON mirror.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    next_id: u64,
    authentication: Vec<Rule>,
    authorization: Vec<Rule>,
}

/// Thread-safe in-memory rule store.
#[derive(Debug)]
pub struct MemoryRuleStore {
    authentication: DashMap<u64, Rule>,
    authorization: DashMap<u64, Rule>,
    next_id: AtomicU64,
    persistence_path: Option<PathBuf>,
    /// Serialises snapshot writes so an older snapshot never overwrites a newer one.
    save_lock: tokio::sync::Mutex<()>,
}

impl Default for MemoryRuleStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MemoryRuleStore {
    /// Create an empty store, optionally mirrored to `persistence_path`.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            authentication: DashMap::new(),
            authorization: DashMap::new(),
            next_id: AtomicU64::new(1),
            persistence_path,
            save_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Load from file if it exists; the file becomes the mirror either way.
    pub fn load_from_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let store = Self::new(Some(path.to_path_buf()));
        if path.exists() {
            let content = std::fs::read(path)?;
            let snapshot: Snapshot = serde_json::from_slice(&content)?;

            let mut max_id = 0;
            for rule in snapshot.authentication {
                max_id = max_id.max(rule.id);
                store.authentication.insert(rule.id, rule);
            }
            for rule in snapshot.authorization {
                max_id = max_id.max(rule.id);
                store.authorization.insert(rule.id, rule);
            }
            store
                .next_id
                .store(snapshot.next_id.max(max_id + 1), Ordering::SeqCst);

            tracing::info!(
                path = %path.display(),
                authentication = store.authentication.len(),
                authorization = store.authorization.len(),
                "Loaded rules from file"
            );
        }
        Ok(store)
    }

    fn table(&self, kind: RuleKind) -> &DashMap<u64, Rule> {
        match kind {
            RuleKind::Authentication => &self.authentication,
            RuleKind::Authorization => &self.authorization,
        }
    }

    fn sorted(table: &DashMap<u64, Rule>, keep: impl Fn(&Rule) -> bool) -> Vec<Rule> {
        let sorted: BTreeMap<u64, Rule> = table
            .iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();
        sorted.into_values().collect()
    }

    /// Write the JSON mirror, if one is configured.
    async fn save(&self) -> StoreResult<()> {
        let Some(path) = &self.persistence_path else {
            return Ok(());
        };
        let _guard = self.save_lock.lock().await;
        let snapshot = Snapshot {
            next_id: self.next_id.load(Ordering::SeqCst),
            authentication: Self::sorted(&self.authentication, |_| true),
            authorization: Self::sorted(&self.authorization, |_| true),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        tokio::fs::write(path, bytes).await?;
        tracing::debug!(path = %path.display(), "Saved rules to file");
        Ok(())
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn insert(&self, kind: RuleKind, rule: NewRule, now: DateTime<Utc>) -> StoreResult<Rule> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let rule = Rule {
            id,
            service: rule.service,
            pattern: rule.pattern,
            methods: rule.methods,
            roles: rule.roles,
            created_at: now,
            updated_at: now,
        };
        self.table(kind).insert(id, rule.clone());
        if let Err(e) = self.save().await {
            self.table(kind).remove(&id);
            return Err(e);
        }
        Ok(rule)
    }

    async fn list(&self, kind: RuleKind) -> StoreResult<Vec<Rule>> {
        Ok(Self::sorted(self.table(kind), |_| true))
    }

    async fn list_for_services(&self, kind: RuleKind, services: &[&str]) -> StoreResult<Vec<Rule>> {
        Ok(Self::sorted(self.table(kind), |rule| {
            services.contains(&rule.service.as_str())
        }))
    }

    async fn update(
        &self,
        kind: RuleKind,
        id: u64,
        patch: RulePatch,
        now: DateTime<Utc>,
    ) -> StoreResult<()> {
        let previous = match self.table(kind).get_mut(&id) {
            Some(mut entry) => {
                let previous = entry.value().clone();
                patch.apply(entry.value_mut());
                entry.value_mut().updated_at = now;
                previous
            }
            None => return Ok(()),
        };
        if let Err(e) = self.save().await {
            self.table(kind).insert(id, previous);
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, kind: RuleKind, id: u64) -> StoreResult<()> {
        let Some((_, removed)) = self.table(kind).remove(&id) else {
            return Ok(());
        };
        if let Err(e) = self.save().await {
            self.table(kind).insert(id, removed);
            return Err(e);
        }
        Ok(())
    }
}
