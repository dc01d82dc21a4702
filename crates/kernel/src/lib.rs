// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! lumenflow-kernel: the orchestration kernel's command surface. Wires
//! `lumenflow-engine`'s transition guards, `lumenflow-storage`'s
//! event-sourced logs, and `lumenflow-projectors`' Markdown boards behind
//! one workspace handle and a cooperative mutex (§5), so a CLI or daemon
//! host never has to reason about collaborator ordering itself.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod board_sync;
pub mod commands;
pub mod error;
pub mod logging;
pub mod workspace;

pub use commands::{
    block, cancel, checkpoint, claim, complete, delegate, generate_context, pickup,
    query_ready_nodes, record_brief_evidence, recover, unblock, CompleteOptions,
};
pub use error::KernelError;
pub use logging::init_tracing;
pub use workspace::{StatePaths, Workspace};
