//! Consolidation report: gather recent daily notes and the long-term
//! memory file, flag old notes for archiving, and build the prompt an
//! LLM uses to fold the notes into MEMORY.md.
//!
//! This module only reads the workspace; writing the consolidated memory
//! back is the operator's (or the LLM's) job.

use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::error::VigilResult;
use crate::workspace::WorkspacePaths;

/// How many trailing days of notes count as "recent".
pub const DEFAULT_DAYS_TO_SCAN: i64 = 3;

/// Notes older than this many days are archive candidates.
pub const DEFAULT_OLD_THRESHOLD_DAYS: i64 = 14;

/// Character budget for MEMORY.md inside the consolidation prompt.
const PROMPT_MEMORY_CHARS: usize = 5_000;

/// Character budget per note inside the consolidation prompt.
const PROMPT_NOTE_CHARS: usize = 3_000;

/// Character budget for note content in `--json` output.
const JSON_CONTENT_CHARS: usize = 500;

#[derive(Debug, Clone, Copy)]
pub struct ReflectConfig {
    pub days_to_scan: i64,
    pub old_threshold_days: i64,
}

impl Default for ReflectConfig {
    fn default() -> Self {
        Self {
            days_to_scan: DEFAULT_DAYS_TO_SCAN,
            old_threshold_days: DEFAULT_OLD_THRESHOLD_DAYS,
        }
    }
}

/// One dated note with its content loaded.
#[derive(Debug, Clone, Serialize)]
pub struct DailyNote {
    pub date: String,
    pub path: PathBuf,
    pub content: String,
    pub chars: usize,
    pub lines: usize,
}

/// A note past the archive threshold. Content is not loaded; the report
/// only needs to name it.
#[derive(Debug, Clone, Serialize)]
pub struct OldNote {
    pub date: String,
    pub path: PathBuf,
    pub age_days: i64,
}

/// The long-term memory file, when present.
#[derive(Debug, Clone, Serialize)]
pub struct MemorySnapshot {
    pub path: PathBuf,
    pub content: String,
    pub chars: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReflectStats {
    pub total_notes: usize,
    pub recent_notes: usize,
    pub old_notes: usize,
    pub memory_md_lines: usize,
}

/// Everything the reflect command reports.
#[derive(Debug, Clone, Serialize)]
pub struct ReflectReport {
    pub generated_at: String,
    pub workspace: PathBuf,
    pub memory_md: Option<MemorySnapshot>,
    pub recent_notes: Vec<DailyNote>,
    pub old_notes: Vec<OldNote>,
    pub stats: ReflectStats,
    pub prompt: String,
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Parse `YYYY-MM-DD` out of a note filename, `None` for anything that is
/// not a dated markdown note.
fn note_date(file_name: &str) -> Option<NaiveDate> {
    let stem = file_name.strip_suffix(".md")?;
    NaiveDate::parse_from_str(stem, "%Y-%m-%d").ok()
}

/// Build the consolidation report for `workspace` as of `today`.
///
/// A missing notes directory or MEMORY.md is not an error: the report
/// simply comes back empty-handed on that side.
pub fn generate_report(
    workspace: &WorkspacePaths,
    config: &ReflectConfig,
    today: NaiveDate,
) -> VigilResult<ReflectReport> {
    let memory_md = match fs::read_to_string(workspace.memory_md()) {
        Ok(content) => Some(MemorySnapshot {
            path: workspace.memory_md(),
            chars: content.chars().count(),
            lines: content.lines().count(),
            content,
        }),
        Err(_) => None,
    };

    let mut dated: Vec<(NaiveDate, PathBuf)> = Vec::new();
    if let Ok(entries) = fs::read_dir(workspace.memory_dir()) {
        for entry in entries.flatten() {
            let name = entry.file_name();
            if let Some(date) = note_date(&name.to_string_lossy()) {
                dated.push((date, entry.path()));
            }
        }
    }
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    let mut recent_notes = Vec::new();
    let mut old_notes = Vec::new();
    for (date, path) in &dated {
        let age_days = (today - *date).num_days();
        // A scan of N days covers ages 0..N, today included.
        if age_days < config.days_to_scan {
            let content = fs::read_to_string(path)?;
            recent_notes.push(DailyNote {
                date: date.to_string(),
                path: path.clone(),
                chars: content.chars().count(),
                lines: content.lines().count(),
                content,
            });
        } else if age_days > config.old_threshold_days {
            old_notes.push(OldNote {
                date: date.to_string(),
                path: path.clone(),
                age_days,
            });
        }
    }
    debug!(
        total = dated.len(),
        recent = recent_notes.len(),
        old = old_notes.len(),
        "scanned daily notes"
    );

    let stats = ReflectStats {
        total_notes: dated.len(),
        recent_notes: recent_notes.len(),
        old_notes: old_notes.len(),
        memory_md_lines: memory_md.as_ref().map_or(0, |m| m.lines),
    };
    let prompt = build_prompt(memory_md.as_ref(), &recent_notes);

    Ok(ReflectReport {
        generated_at: Utc::now().to_rfc3339(),
        workspace: workspace.root.clone(),
        memory_md,
        recent_notes,
        old_notes,
        stats,
        prompt,
    })
}

fn build_prompt(memory: Option<&MemorySnapshot>, notes: &[DailyNote]) -> String {
    let mut prompt = String::from(
        "You are consolidating an agent's working memory. Compare the recent \
         daily notes against the long-term memory and propose what to fold \
         in, what to correct, and what to drop.\n\n## Current MEMORY.md\n\n",
    );
    match memory {
        Some(snapshot) => prompt.push_str(&truncate_chars(&snapshot.content, PROMPT_MEMORY_CHARS)),
        None => prompt.push_str("(no MEMORY.md yet)"),
    }
    prompt.push_str("\n\n## Recent daily notes\n");
    if notes.is_empty() {
        prompt.push_str("\n(none)\n");
    }
    for note in notes {
        prompt.push_str(&format!(
            "\n### {}\n\n{}\n",
            note.date,
            truncate_chars(&note.content, PROMPT_NOTE_CHARS)
        ));
    }
    prompt.push_str(
        "\nRespond with a single JSON object: {\"additions\": [...], \
         \"updates\": [{\"old\": ..., \"new\": ...}], \"removals\": [...]}. \
         Each entry is one durable fact. No commentary outside the JSON.\n",
    );
    prompt
}

impl ReflectReport {
    /// Copy with note and memory content cut down for machine output.
    pub fn truncated_for_output(mut self) -> Self {
        if let Some(snapshot) = self.memory_md.as_mut() {
            snapshot.content = truncate_chars(&snapshot.content, JSON_CONTENT_CHARS);
        }
        for note in &mut self.recent_notes {
            note.content = truncate_chars(&note.content, JSON_CONTENT_CHARS);
        }
        self
    }

    /// Human-readable rendering for terminal output.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "workspace: {}\nnotes: {} total, {} recent, {} archive candidates\n",
            self.workspace.display(),
            self.stats.total_notes,
            self.stats.recent_notes,
            self.stats.old_notes,
        );
        match &self.memory_md {
            Some(snapshot) => out.push_str(&format!(
                "MEMORY.md: {} lines, {} chars\n",
                snapshot.lines, snapshot.chars
            )),
            None => out.push_str("MEMORY.md: missing\n"),
        }
        if !self.recent_notes.is_empty() {
            out.push_str("\nrecent notes:\n");
            for note in &self.recent_notes {
                out.push_str(&format!(
                    "  {}  {} lines, {} chars\n",
                    note.date, note.lines, note.chars
                ));
            }
        }
        if !self.old_notes.is_empty() {
            out.push_str("\narchive candidates:\n");
            for note in &self.old_notes {
                out.push_str(&format!("  {}  ({} days old)\n", note.date, note.age_days));
            }
        }
        out.push_str("\n--- consolidation prompt ---\n\n");
        out.push_str(&self.prompt);
        out
    }
}
