// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

use super::*;
use lumenflow_core::{Wu, WuStatus};

fn wu(status: WuStatus) -> Wu {
    Wu::builder("WU-100").title("Add widget").status(status).build()
}

#[test]
fn sync_status_board_adds_a_fresh_item_under_its_status_heading() {
    let mut board = Board::new(STATUS_HEADINGS.iter().map(|h| h.to_string()).collect());
    sync_status_board(&mut board, &wu(WuStatus::Ready)).unwrap();
    assert_eq!(board.items_in("Ready").len(), 1);
    assert!(board.items_in("Ready")[0].contains("WU-100"));
}

#[test]
fn sync_status_board_moves_on_transition() {
    let mut board = Board::new(STATUS_HEADINGS.iter().map(|h| h.to_string()).collect());
    sync_status_board(&mut board, &wu(WuStatus::Ready)).unwrap();
    sync_status_board(&mut board, &wu(WuStatus::InProgress)).unwrap();
    assert!(board.items_in("Ready").is_empty());
    assert_eq!(board.items_in("In Progress").len(), 1);
}

#[test]
fn sync_status_board_lists_done_on_completion() {
    let mut board = Board::new(STATUS_HEADINGS.iter().map(|h| h.to_string()).collect());
    sync_status_board(&mut board, &wu(WuStatus::InProgress)).unwrap();
    sync_status_board(&mut board, &wu(WuStatus::Done)).unwrap();
    assert_eq!(board.items_in("Done").len(), 1);
    assert!(board.items_in("In Progress").is_empty());
}

#[test]
fn sync_backlog_board_drops_item_once_done() {
    let mut board = Board::new(BACKLOG_HEADINGS.iter().map(|h| h.to_string()).collect());
    sync_backlog_board(&mut board, &wu(WuStatus::Ready)).unwrap();
    sync_backlog_board(&mut board, &wu(WuStatus::InProgress)).unwrap();
    assert_eq!(board.items_in("In Progress").len(), 1);

    sync_backlog_board(&mut board, &wu(WuStatus::Done)).unwrap();
    assert!(board.items_in("In Progress").is_empty());
    assert!(board.items_in("Backlog").is_empty());
}

#[test]
fn sync_is_idempotent_for_an_unchanged_status() {
    let mut board = Board::new(STATUS_HEADINGS.iter().map(|h| h.to_string()).collect());
    sync_status_board(&mut board, &wu(WuStatus::Ready)).unwrap();
    sync_status_board(&mut board, &wu(WuStatus::Ready)).unwrap();
    assert_eq!(board.items_in("Ready").len(), 1);
}
