// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Tracing setup for a host process embedding the kernel. File rotation
//! and non-blocking writers are the host's concern (a daemon binary picks
//! its own log path); this just wires `RUST_LOG`-driven filtering to
//! stdout so every collaborator crate's `tracing::{debug,warn,error}`
//! calls land somewhere by default.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a global subscriber honoring `RUST_LOG`, defaulting to `info`
/// when unset or unparsable. Call once, as early as possible in `main`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}
