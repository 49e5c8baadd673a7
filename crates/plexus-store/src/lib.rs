//! Plexus graph store contract
//!
//! Everything the engine needs to talk to a graph store without knowing
//! which one it is:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      plexus-engine                            │
//! │   (factory, permissions, lifecycle, sync points)              │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │ logical documents, typed queries
//! ┌──────────────────────────────▼────────────────────────────────┐
//! │                      plexus-store                             │
//! │  collections  │  translate  │  query  │  GraphQueryExecutor   │
//! └──────────────────────────────┬────────────────────────────────┘
//!                                │ native documents (_key/_from/_to)
//!                     ┌──────────▼──────────┐
//!                     │  graph store / the  │
//!                     │   MemoryExecutor    │
//!                     └─────────────────────┘
//! ```
//!
//! The [`translate`] module is the only place that knows the store's native
//! field names; [`collections`] is the only place that knows physical
//! collection names. The [`MemoryExecutor`] implements the full executor
//! contract in memory so the engine is testable without a live store.

pub mod collections;
pub mod error;
pub mod executor;
pub mod memory;
pub mod query;
pub mod translate;

pub use collections::{EdgeCollection, EdgeDefinition, NodeCollection, GRAPH_NAME};
pub use error::StoreError;
pub use executor::{GraphQueryExecutor, TransactionId, UpsertReport};
pub use memory::MemoryExecutor;
pub use query::{Action, Filter, Query};
