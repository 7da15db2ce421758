//! Access-control rules.
//!
//! # Data Flow
//! ```text
//! Admin API (create/update/delete)
//!     → repository.rs (timestamps, wildcard union)
//!     → store.rs (RuleStore: in-memory maps, optional JSON mirror)
//!
//! Orchestrator (read-only)
//!     → repository.get_by_service(kind, service)
//!     → security::access_control (match against the request)
//! ```

pub mod model;
pub mod repository;
pub mod store;

pub use model::{NewRule, Rule, RuleKind, RulePatch, ANY_SERVICE, WILDCARD};
pub use repository::RuleRepository;
pub use store::{MemoryRuleStore, RuleStore, StoreError};
