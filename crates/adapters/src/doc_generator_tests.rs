// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;

#[tokio::test]
async fn noop_generator_returns_no_touched_paths() {
    let dir = tempfile::tempdir().unwrap();
    let touched = NoopDocGenerator.regenerate(dir.path()).await.unwrap();
    assert!(touched.is_empty());
}

#[tokio::test]
async fn command_generator_surfaces_a_nonzero_exit_as_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let generator = CommandDocGenerator { command: vec!["sh".to_string(), "-c".to_string(), "exit 1".to_string()] };
    let err = generator.regenerate(dir.path()).await.unwrap_err();
    assert!(matches!(err, DocGeneratorError::CommandFailed(_)));
}

#[tokio::test]
async fn command_generator_succeeds_on_zero_exit() {
    let dir = tempfile::tempdir().unwrap();
    let generator = CommandDocGenerator { command: vec!["true".to_string()] };
    let touched = generator.regenerate(dir.path()).await.unwrap();
    assert!(touched.is_empty());
}
