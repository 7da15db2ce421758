//! Rule repository.
//!
//! # Responsibilities
//! - CRUD over authentication and authorization rules
//! - Stamp `created_at` / `updated_at`
//! - Union service rules with wildcard-service rules for lookups
//!
//! # Design Decisions
//! - Routing only ever reads; writes come from the admin API
//! - Rules are read fresh for every request (no cache to invalidate)

use std::sync::Arc;

use chrono::Utc;

use crate::rules::model::{NewRule, Rule, RuleKind, RulePatch, ANY_SERVICE};
use crate::rules::store::{RuleStore, StoreResult};

/// Repository over an abstract rule store.
#[derive(Clone)]
pub struct RuleRepository {
    store: Arc<dyn RuleStore>,
}

impl RuleRepository {
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self { store }
    }

    /// Create a rule, stamping both timestamps with the current time.
    pub async fn create(&self, kind: RuleKind, rule: NewRule) -> StoreResult<Rule> {
        let rule = self.store.insert(kind, rule, Utc::now()).await?;
        tracing::info!(kind = %kind, id = rule.id, service = %rule.service, pattern = %rule.pattern, "Rule created");
        Ok(rule)
    }

    pub async fn get_all(&self, kind: RuleKind) -> StoreResult<Vec<Rule>> {
        self.store.list(kind).await
    }

    /// Rules filed under `service` plus every wildcard-service rule.
    pub async fn get_by_service(&self, kind: RuleKind, service: &str) -> StoreResult<Vec<Rule>> {
        if service == ANY_SERVICE {
            return self.store.list_for_services(kind, &[ANY_SERVICE]).await;
        }
        self.store
            .list_for_services(kind, &[service, ANY_SERVICE])
            .await
    }

    /// Patch a rule and refresh `updated_at`. Unknown ids are a no-op.
    pub async fn update(&self, kind: RuleKind, id: u64, patch: RulePatch) -> StoreResult<()> {
        self.store.update(kind, id, patch, Utc::now()).await?;
        tracing::info!(kind = %kind, id, "Rule updated");
        Ok(())
    }

    /// Delete a rule. Unknown ids are a no-op.
    pub async fn delete(&self, kind: RuleKind, id: u64) -> StoreResult<()> {
        self.store.remove(kind, id).await?;
        tracing::info!(kind = %kind, id, "Rule deleted");
        Ok(())
    }
}

impl std::fmt::Debug for RuleRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRepository").finish_non_exhaustive()
    }
}
