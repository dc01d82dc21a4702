// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lumenflow-core: shared data model for the LumenFlow orchestration kernel.

pub mod macros;

pub mod clock;
pub mod config;
pub mod delegation;
pub mod error;
pub mod event;
pub mod id;
pub mod memory;
pub mod signal;
pub mod wu;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{
    BriefPolicyMode, ConfigError, ConfigWarning, ControlPlaneConfig, Directories, GitConfig,
    LaneConfig, SandboxConfig, WorkspaceConfig,
};
pub use delegation::{
    Delegation, DelegationId, DelegationIntent, DelegationStatus, InvalidDelegationId,
};
pub use error::{ErrorKind, LumenError, RecordLocation};
pub use event::{CheckpointDetail, Event, EventKind};
pub use memory::{
    compute_decay_score, Lifecycle, MemoryNode, MemoryNodeId, Relationship, RelationshipKind,
    DEFAULT_HALF_LIFE_DAYS,
};
pub use signal::{Severity, Signal, SignalId, SignalPayload, SpawnFailurePayload, SuggestedAction};
pub use wu::{Exposure, InvalidWuId, Lane, LockPolicy, Priority, TestRefs, Wu, WuId, WuStatus, WuType};

#[cfg(any(test, feature = "test-support"))]
pub use wu::WuBuilder;
