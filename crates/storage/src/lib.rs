// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lumenflow-storage: append-only on-disk stores for the LumenFlow
//! orchestration kernel — the WU event log, delegation registry, memory
//! and relationship logs, and signal bus (§3, §4.1, §4.4, §4.6, §4.7).

pub mod append_log;
pub mod delegation_registry;
pub mod event_log;
pub mod memory_store;
pub mod relationship_store;
pub mod signal_store;
pub mod snapshot;
pub mod state;

pub use append_log::{AppendLog, AppendLogError};
pub use delegation_registry::{DelegationRegistry, DelegationRegistryError};
pub use event_log::{EventLog, EventLogError};
pub use memory_store::{MemoryStore, MemoryStoreError};
pub use relationship_store::{RelationshipStore, RelationshipStoreError};
pub use signal_store::{SignalStore, SignalStoreError};
pub use snapshot::{Snapshot, SnapshotStore};
pub use state::{MaterializedState, WuRuntimeState};
