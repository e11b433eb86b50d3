//! `issue-store` - client-side issue cache with optimistic writes.
//!
//! Holds issues in memory, derives filtered and ordered views for list and
//! board rendering, applies writes optimistically with per-mutation
//! rollback, and assigns drag-and-drop ranks that never require a full
//! re-index round trip.
//!
//! # Quick Start
//!
//! ```no_run
//! use issue_store::{IssueStore, IssueUpdate, Status, StoreConfig};
//! use issue_store::model::Issue;
//!
//! let mut store = IssueStore::with_issues(StoreConfig::default(), vec![Issue {
//!     id: "ENG-1".into(),
//!     title: "Fix login".into(),
//!     ..Default::default()
//! }])
//! .unwrap();
//!
//! // Optimistic write: visible immediately
//! let ticket = store
//!     .mutate("ENG-1", IssueUpdate { title: Some("Fix login redirect".into()), ..Default::default() })
//!     .unwrap();
//!
//! // Drag to the top of "in progress"
//! let moved = store.move_issue("ENG-1", &Status::InProgress, 0).unwrap();
//!
//! // Later, once the backend answered
//! let echo = store.get("ENG-1").cloned().unwrap();
//! store.resolve(ticket.mutation, Ok(echo)).unwrap();
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod filter;
pub mod jsonl;
pub mod model;
pub mod mutation;
pub mod order;
pub mod query;
pub mod remote;
pub mod store;
pub mod table;

pub use config::StoreConfig;
pub use driver::{MoveHandle, MutationHandle, RemoteStore};
pub use error::{Result, StoreError};
pub use filter::BoardColumn;
pub use model::{Issue, NewIssue, Priority, Status};
pub use mutation::{MutationId, MutationStatus, PendingMutation, Resolution};
pub use order::{MovePlan, OrderManager};
pub use query::{IssueFilter, IssueUpdate, SortField, ViewMode};
pub use remote::{IssueApi, RemoteError};
pub use store::{IssueStore, MoveTickets, MutationTicket, StoreEvent, Subscription};
pub use table::IssueTable;
