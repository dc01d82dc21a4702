// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Status/backlog heading conventions (§4.2, §8 scenario 1 "status
//! projection lists WU-100 under 'Done'; backlog removes it from 'In
//! Progress'"). `lumenflow_projectors::markdown::Board` is pure
//! parse/render with no notion of WU status — this module is the glue
//! that decides which heading a WU's current status belongs under.

use lumenflow_core::{Wu, WuStatus};
use lumenflow_projectors::{Board, MoveItemOptions, ProjectorsError};

/// `status.md` carries every non-terminal-and-terminal status as its own
/// section, in lifecycle order.
pub const STATUS_HEADINGS: &[&str] = &["Ready", "In Progress", "Blocked", "Done", "Cancelled"];

/// `backlog.md` is a narrower working view: only `ready` and
/// `in_progress` WUs appear on it at all (§8 scenario 1 treats leaving
/// backlog's "In Progress" section as part of completing a WU).
pub const BACKLOG_HEADINGS: &[&str] = &["Backlog", "In Progress"];

pub fn status_heading(status: WuStatus) -> &'static str {
    match status {
        WuStatus::Ready => "Ready",
        WuStatus::InProgress => "In Progress",
        WuStatus::Blocked => "Blocked",
        WuStatus::Done => "Done",
        WuStatus::Cancelled => "Cancelled",
    }
}

/// `None` means the WU no longer belongs on the backlog board at all.
fn backlog_heading(status: WuStatus) -> Option<&'static str> {
    match status {
        WuStatus::Ready => Some("Backlog"),
        WuStatus::InProgress => Some("In Progress"),
        WuStatus::Blocked | WuStatus::Done | WuStatus::Cancelled => None,
    }
}

fn render_line(wu: &Wu) -> String {
    format!("- **{}**: {}", wu.id.as_str(), wu.title)
}

/// Moves `wu`'s line into the section matching `to`, adding it fresh if
/// it isn't tracked on the board yet (first claim, or a WU created
/// directly as `ready`).
fn upsert(board: &mut Board, wu: &Wu, from_hint: &str, to: &str) -> Result<(), ProjectorsError> {
    match board.move_item(wu.id.as_str(), from_hint, to, &MoveItemOptions::default()) {
        Ok(_) => Ok(()),
        Err(ProjectorsError::ItemNotFound { .. }) => {
            board.add_item(to, render_line(wu));
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Syncs `wu`'s entry in the status board to its current status.
pub fn sync_status_board(board: &mut Board, wu: &Wu) -> Result<(), ProjectorsError> {
    upsert(board, wu, "Ready", status_heading(wu.status))
}

/// Syncs `wu`'s entry in the backlog board, removing it entirely once it
/// leaves `ready`/`in_progress`.
pub fn sync_backlog_board(board: &mut Board, wu: &Wu) -> Result<(), ProjectorsError> {
    match backlog_heading(wu.status) {
        Some(to) => upsert(board, wu, "Backlog", to),
        None => {
            // No real heading is named "" (§4.2 `moveItem`'s `to` must be
            // declared or `create_missing_heading` must be set), so this
            // keeps nothing and purges every declared section.
            board.remove_from_all_sections_except(wu.id.as_str(), "");
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "board_sync_tests.rs"]
mod tests;
