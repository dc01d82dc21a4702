// SPDX-License-Identifier: MIT
// Copyright (c) 2026 LumenFlow contributors

//! Status/backlog Markdown projector (§4.2): a board is a YAML front
//! matter declaring heading order, followed by `## Heading` sections each
//! holding WU list items. Rewriting is pure: unrelated content (anything
//! that isn't a recognised list item) and heading order are preserved.

use crate::error::ProjectorsError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    headings: Vec<String>,
}

/// A parsed status/backlog board. `sections` preserves insertion order of
/// both headings and lines within a heading.
#[derive(Debug, Clone)]
pub struct Board {
    headings: Vec<String>,
    sections: IndexMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveItemOptions {
    /// If `to` isn't a declared heading, append it to the board instead
    /// of failing (§4.2 doesn't specify this; off by default so a typo'd
    /// heading surfaces as an error rather than silently creating one).
    pub create_missing_heading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Item was already only in `to`; nothing changed (§4.2 "idempotent").
    AlreadyAtTarget,
    /// Item moved from one section into `to`.
    Moved,
    /// Item was present in more than one section; all copies were
    /// collapsed into `to` (§4.2 "if duplicated across sections, remove
    /// from all sections except target").
    MovedAndDeduplicated,
}

fn line_id(line: &str) -> Option<String> {
    let idx = line.find("WU-")?;
    let rest = &line[idx + 3..];
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(format!("WU-{digits}"))
    }
}

impl Board {
    pub fn new(headings: Vec<String>) -> Self {
        let mut sections = IndexMap::new();
        for h in &headings {
            sections.insert(h.clone(), Vec::new());
        }
        Self { headings, sections }
    }

    pub fn parse(content: &str) -> Result<Self, ProjectorsError> {
        let (front_matter, body) = split_front_matter(content);
        let front: FrontMatter = match front_matter {
            Some(yaml) => serde_yaml::from_str(yaml)
                .map_err(|e| ProjectorsError::ParseYaml { path: "<board>".into(), source: e })?,
            None => FrontMatter::default(),
        };

        let mut headings = front.headings;
        let mut sections: IndexMap<String, Vec<String>> = IndexMap::new();
        for h in &headings {
            sections.insert(h.clone(), Vec::new());
        }

        let mut current: Option<String> = None;
        for line in body.lines() {
            if let Some(h) = line.strip_prefix("## ") {
                let h = h.trim().to_string();
                if !headings.contains(&h) {
                    headings.push(h.clone());
                }
                sections.entry(h.clone()).or_default();
                current = Some(h);
                continue;
            }
            if let Some(h) = &current {
                if line.trim().is_empty() {
                    continue;
                }
                sections.entry(h.clone()).or_default().push(line.to_string());
            }
        }

        Ok(Self { headings, sections })
    }

    pub fn render(&self) -> String {
        let front = FrontMatter { headings: self.headings.clone() };
        let yaml = serde_yaml::to_string(&front).unwrap_or_default();
        let mut out = format!("---\n{yaml}---\n\n");
        for heading in &self.headings {
            out.push_str("## ");
            out.push_str(heading);
            out.push_str("\n\n");
            if let Some(items) = self.sections.get(heading) {
                for item in items {
                    out.push_str(item);
                    out.push('\n');
                }
            }
            out.push('\n');
        }
        out
    }

    fn headings_containing(&self, id: &str) -> Vec<String> {
        self.headings
            .iter()
            .filter(|h| {
                self.sections.get(*h).map(|items| items.iter().any(|l| line_id(l).as_deref() == Some(id))).unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// §4.2 `moveItem(id, fromHeading, toHeading, opts)`. `from` is a hint
    /// for the not-found error message; the item's actual location(s) are
    /// discovered by scanning every section, so a stale `from` still
    /// resolves correctly.
    pub fn move_item(
        &mut self,
        id: &str,
        from: &str,
        to: &str,
        opts: &MoveItemOptions,
    ) -> Result<MoveOutcome, ProjectorsError> {
        let currently_in = self.headings_containing(id);

        if currently_in.len() == 1 && currently_in[0] == to {
            return Ok(MoveOutcome::AlreadyAtTarget);
        }

        let mut captured_line = None;
        for heading in currently_in.clone() {
            if let Some(items) = self.sections.get_mut(&heading) {
                if let Some(pos) = items.iter().position(|l| line_id(l).as_deref() == Some(id)) {
                    let removed = items.remove(pos);
                    captured_line.get_or_insert(removed);
                }
            }
        }

        let line = captured_line
            .ok_or_else(|| ProjectorsError::ItemNotFound { id: id.to_string(), heading: from.to_string() })?;

        if !self.headings.iter().any(|h| h == to) {
            if opts.create_missing_heading {
                self.headings.push(to.to_string());
            } else {
                return Err(ProjectorsError::UnknownHeading { heading: to.to_string() });
            }
        }

        self.sections.entry(to.to_string()).or_default().push(line);

        Ok(if currently_in.len() > 1 { MoveOutcome::MovedAndDeduplicated } else { MoveOutcome::Moved })
    }

    /// §4.2 `removeFromAllSectionsExcept`: repair after a race left an
    /// item duplicated or orphaned in the wrong section(s).
    pub fn remove_from_all_sections_except(&mut self, id: &str, keep: &str) {
        for heading in self.headings.clone() {
            if heading == keep {
                continue;
            }
            if let Some(items) = self.sections.get_mut(&heading) {
                items.retain(|l| line_id(l).as_deref() != Some(id));
            }
        }
    }

    pub fn items_in(&self, heading: &str) -> &[String] {
        self.sections.get(heading).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add_item(&mut self, heading: &str, line: String) {
        self.sections.entry(heading.to_string()).or_default().push(line);
        if !self.headings.iter().any(|h| h == heading) {
            self.headings.push(heading.to_string());
        }
    }
}

fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let Some(rest) = content.strip_prefix("---\n") else {
        return (None, content);
    };
    match rest.find("\n---\n") {
        Some(end) => (Some(&rest[..end]), &rest[end + 5..]),
        None => (None, content),
    }
}

#[cfg(test)]
#[path = "markdown_tests.rs"]
mod tests;
