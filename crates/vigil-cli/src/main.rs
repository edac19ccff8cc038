//! Vigil - memory hygiene & video-QA toolkit
//!
//! The `vigil` command bundles the operational tools around an agent
//! workspace:
//!
//! - `decay`: score stored memories on the forgetting curve and prune
//! - `import`: chunk workspace markdown into the memory store
//! - `reflect`: build a consolidation report from recent daily notes
//! - `qa`: have an LLM judge score video-analysis artifacts
//! - `report`: aggregate QA artifacts into CSV/HTML reports
//! - `save-db`: persist QA artifacts to the relational store

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn, Level};

use vigil_core::decay::policy::{analyze, cleanup, DecayAnalysis};
use vigil_core::decay::retention::{DecayParams, DEFAULT_HALF_LIFE_DAYS, DEFAULT_THRESHOLD};
use vigil_core::obs::DecaySpan;
use vigil_core::qa::report::{load_results, write_csv, write_html, SummaryStats};
use vigil_core::qa::score::QaResult;
use vigil_core::reflect::{generate_report, ReflectConfig, DEFAULT_DAYS_TO_SCAN};
use vigil_core::{split_into_chunks, WorkspacePaths};
use vigil_judge::JudgeClient;
use vigil_store::{MemoryStore, QaLedger, StoreHandle};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Memory hygiene & video-QA toolkit", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score stored memories on the forgetting curve; prune on request
    ///
    /// Without --cleanup this is always a dry run: the report shows what
    /// would be removed and nothing is touched.
    Decay {
        /// Actually delete decayed records
        #[arg(long)]
        cleanup: bool,

        /// Preview only, even when --cleanup is given
        #[arg(long)]
        dry_run: bool,

        /// Half-life in days
        #[arg(long, default_value_t = DEFAULT_HALF_LIFE_DAYS, value_parser = parse_half_life)]
        half_life: f64,

        /// Retention threshold below which a record decays
        #[arg(long, default_value_t = DEFAULT_THRESHOLD, value_parser = parse_threshold)]
        threshold: f64,

        /// Memory owner scope
        #[arg(short, long, env = "VIGIL_MEMORY_USER", default_value = "agent")]
        user: String,
    },

    /// Chunk workspace markdown into the memory store
    Import {
        /// Import MEMORY.md plus every daily note
        #[arg(long)]
        all: bool,

        /// Import only the most recent N daily notes
        #[arg(long, conflicts_with = "all")]
        daily: Option<usize>,

        /// Print store statistics instead of importing
        #[arg(long)]
        stats: bool,

        /// Character budget per chunk
        #[arg(long, default_value_t = vigil_core::chunk::DEFAULT_MAX_CHARS)]
        max_chars: usize,

        /// Memory owner scope
        #[arg(short, long, env = "VIGIL_MEMORY_USER", default_value = "agent")]
        user: String,

        /// Workspace root (default: $VIGIL_WORKSPACE or cwd)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },

    /// Build a consolidation report from recent daily notes
    Reflect {
        /// Emit the report as JSON (content truncated)
        #[arg(long)]
        json: bool,

        /// How many trailing days of notes count as recent
        #[arg(long, default_value_t = DEFAULT_DAYS_TO_SCAN)]
        days: i64,

        /// Workspace root (default: $VIGIL_WORKSPACE or cwd)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },

    /// LLM-judged QA scoring of video-analysis artifacts
    Qa {
        #[command(subcommand)]
        action: QaAction,
    },

    /// Aggregate QA artifacts into CSV/HTML reports
    Report {
        /// Directory holding `*_qa.json` artifacts
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Write a CSV report to this path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write an HTML report to this path
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Persist QA artifacts to the relational store
    SaveDb {
        /// Directory holding `*_qa.json` artifacts
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum QaAction {
    /// Evaluate a single analysis against its transcript
    Single {
        /// Public video id the artifact belongs to
        video: String,

        /// Path to the source transcript
        #[arg(short, long)]
        transcript: PathBuf,

        /// Path to the analysis under review
        #[arg(short, long)]
        analysis: PathBuf,

        /// Directory to write the `<video>_qa.json` artifact into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Evaluate every `<id>_analysis.md` / `<id>_transcript.txt` pair in a directory
    Batch {
        /// Directory of analysis/transcript pairs
        dir: PathBuf,

        /// Keep artifacts only for videos scoring below this total
        #[arg(long, default_value_t = 7.0)]
        min_score: f64,

        /// Evaluate at most this many videos
        #[arg(long)]
        max_videos: Option<usize>,

        /// Directory to write artifacts into (default: same as input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Retention above 1.0 would follow from a non-positive half-life, so
/// reject it at the flag.
fn parse_half_life(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err("half-life must be a positive number of days".to_string())
    }
}

fn parse_threshold(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{s}' is not a number"))?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err("threshold must lie strictly between 0 and 1".to_string())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    vigil_core::telemetry::init_tracing(cli.json_logs, level);

    match cli.command {
        Commands::Decay {
            cleanup: do_cleanup,
            dry_run,
            half_life,
            threshold,
            user,
        } => {
            let handle = StoreHandle::setup_from_env()
                .await
                .context("Failed to connect to memory store")?;
            let params = DecayParams {
                half_life_days: half_life,
                threshold,
            };
            // Dry run unless --cleanup is given without --dry-run.
            let effective_dry_run = !do_cleanup || dry_run;
            cmd_decay(&handle, &user, &params, effective_dry_run).await
        }
        Commands::Import {
            all,
            daily,
            stats,
            max_chars,
            user,
            workspace,
        } => {
            let handle = StoreHandle::setup_from_env()
                .await
                .context("Failed to connect to memory store")?;
            if stats {
                return cmd_import_stats(&handle, &user).await;
            }
            let workspace = WorkspacePaths::discover(workspace.as_deref())?;
            let mode = if all {
                ImportMode::All
            } else if let Some(n) = daily {
                ImportMode::Daily(n)
            } else {
                ImportMode::MemoryOnly
            };
            cmd_import(&handle, &workspace, &user, mode, max_chars).await
        }
        Commands::Reflect {
            json,
            days,
            workspace,
        } => {
            let workspace = WorkspacePaths::discover(workspace.as_deref())?;
            cmd_reflect(&workspace, days, json)
        }
        Commands::Qa { action } => {
            let client = JudgeClient::from_env().context("Failed to set up judge client")?;
            match action {
                QaAction::Single {
                    video,
                    transcript,
                    analysis,
                    output,
                } => cmd_qa_single(&client, &video, &transcript, &analysis, &output).await,
                QaAction::Batch {
                    dir,
                    min_score,
                    max_videos,
                    output,
                } => {
                    let output = output.unwrap_or_else(|| dir.clone());
                    cmd_qa_batch(&client, &dir, min_score, max_videos, &output).await
                }
            }
        }
        Commands::Report { dir, csv, html } => {
            cmd_report(&dir, csv.as_deref(), html.as_deref())
        }
        Commands::SaveDb { dir } => {
            let handle = StoreHandle::setup_from_env()
                .await
                .context("Failed to connect to QA ledger")?;
            cmd_save_db(&handle, &dir).await
        }
    }
}

/// Run retention analysis, print the report, and optionally prune.
async fn cmd_decay(
    store: &dyn MemoryStore,
    user: &str,
    params: &DecayParams,
    dry_run: bool,
) -> Result<()> {
    let _span = DecaySpan::enter(user);
    // A listing failure is fatal: bucket membership needs the full set.
    let records = store
        .list_all(user)
        .await
        .context("Failed to list memories; no partial report is possible")?;
    let analysis = analyze(&records, params, Utc::now());
    print_decay_report(&analysis, params);

    let outcome = cleanup(store, &analysis, dry_run).await;
    if dry_run {
        println!(
            "\nDry run: {} record(s) would be removed. Re-run with --cleanup to prune.",
            analysis.decay_candidates.len()
        );
    } else {
        println!(
            "\nRemoved {} record(s); {} delete(s) failed.",
            outcome.removed, outcome.failed
        );
    }
    Ok(())
}

fn print_decay_report(analysis: &DecayAnalysis, params: &DecayParams) {
    println!(
        "{} memories analyzed (half-life {} days, threshold {})",
        analysis.total, params.half_life_days, params.threshold
    );
    println!(
        "  keep: {}  decay candidates: {}  no timestamp: {}",
        analysis.keep.len(),
        analysis.decay_candidates.len(),
        analysis.no_timestamp.len()
    );
    if !analysis.decay_candidates.is_empty() {
        println!("\ndecay candidates:");
        for item in &analysis.decay_candidates {
            println!(
                "  {}  r={:.3}  [{}]  {}",
                item.id,
                item.retention_display(),
                item.timestamp,
                item.preview
            );
        }
    }
    if !analysis.no_timestamp.is_empty() {
        println!("\nno timestamp (never pruned):");
        for item in &analysis.no_timestamp {
            println!("  {}  {}", item.id, item.preview);
        }
    }
}

enum ImportMode {
    /// Just MEMORY.md.
    MemoryOnly,
    /// The most recent N daily notes.
    Daily(usize),
    /// MEMORY.md plus every daily note.
    All,
}

/// Chunk the selected workspace files into the memory store.
async fn cmd_import(
    store: &dyn MemoryStore,
    workspace: &WorkspacePaths,
    user: &str,
    mode: ImportMode,
    max_chars: usize,
) -> Result<()> {
    let mut files: Vec<PathBuf> = Vec::new();
    match mode {
        ImportMode::MemoryOnly => files.push(workspace.memory_md()),
        ImportMode::All => {
            files.push(workspace.memory_md());
            files.extend(daily_notes(&workspace.memory_dir()));
        }
        ImportMode::Daily(n) => {
            let notes = daily_notes(&workspace.memory_dir());
            files.extend(notes.into_iter().take(n));
        }
    }

    let mut imported = 0usize;
    let mut failed = 0usize;
    for path in &files {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(file = %path.display(), error = %err, "skipping unreadable file");
                continue;
            }
        };
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let chunks = split_into_chunks(&text, max_chars);
        info!(file = %source, chunks = chunks.len(), "importing");
        for chunk in &chunks {
            let metadata = serde_json::json!({
                "source": source,
                "date": Utc::now().date_naive().to_string(),
            });
            // A chunk that fails to store must not sink the rest.
            match store.add(user, chunk, metadata).await {
                Ok(_) => imported += 1,
                Err(err) => {
                    warn!(file = %source, error = %err, "failed to store chunk");
                    failed += 1;
                }
            }
        }
    }

    let total = store.count(user).await?;
    println!(
        "imported {imported} chunk(s) from {} file(s) ({failed} failed); store now holds {total}",
        files.len()
    );
    Ok(())
}

/// Dated notes under the memory directory, newest first.
fn daily_notes(dir: &Path) -> Vec<PathBuf> {
    let mut notes: Vec<(String, PathBuf)> = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(stem) = name.strip_suffix(".md") {
                if chrono::NaiveDate::parse_from_str(stem, "%Y-%m-%d").is_ok() {
                    notes.push((name, entry.path()));
                }
            }
        }
    }
    notes.sort_by(|a, b| b.0.cmp(&a.0));
    notes.into_iter().map(|(_, path)| path).collect()
}

/// Print how many memories the store holds for the owner.
async fn cmd_import_stats(store: &dyn MemoryStore, user: &str) -> Result<()> {
    let total = store.count(user).await?;
    println!("memories stored for '{user}': {total}");
    Ok(())
}

/// Print (or emit as JSON) the consolidation report.
fn cmd_reflect(workspace: &WorkspacePaths, days: i64, json: bool) -> Result<()> {
    let config = ReflectConfig {
        days_to_scan: days,
        ..ReflectConfig::default()
    };
    let report = generate_report(workspace, &config, Utc::now().date_naive())?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report.truncated_for_output())?
        );
    } else {
        println!("{}", report.render_text());
    }
    Ok(())
}

/// Evaluate one analysis against its transcript.
async fn evaluate_one(
    client: &JudgeClient,
    video: &str,
    transcript_path: &Path,
    analysis_path: &Path,
) -> Result<QaResult> {
    let transcript = std::fs::read_to_string(transcript_path)
        .with_context(|| format!("Failed to read transcript: {}", transcript_path.display()))?;
    let analysis = std::fs::read_to_string(analysis_path)
        .with_context(|| format!("Failed to read analysis: {}", analysis_path.display()))?;

    let started = Instant::now();
    let verdict = client.evaluate(video, &transcript, &analysis).await?;
    let duration = started.elapsed().as_secs_f64();

    Ok(QaResult::assemble(
        video,
        client.model(),
        &verdict.dimensions,
        verdict.recommendations,
        verdict.strengths,
        duration,
        verdict.tokens_used,
    ))
}

fn write_artifact(result: &QaResult, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(format!("{}_qa.json", result.video_id));
    std::fs::write(&path, serde_json::to_string_pretty(result)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Evaluate one analysis and write its `<video>_qa.json` artifact.
async fn cmd_qa_single(
    client: &JudgeClient,
    video: &str,
    transcript_path: &Path,
    analysis_path: &Path,
    output_dir: &Path,
) -> Result<()> {
    let result = evaluate_one(client, video, transcript_path, analysis_path).await?;
    let path = write_artifact(&result, output_dir)?;
    println!(
        "{video}: {:.2} ({}) — {} issue(s), wrote {}",
        result.total_score,
        result.grade,
        result.issues_count(),
        path.display()
    );
    Ok(())
}

#[derive(Serialize)]
struct BatchSummary {
    evaluated: usize,
    failed: usize,
    min_score: f64,
    /// Every evaluated video; only sub-floor ones keep a full artifact.
    results: Vec<BatchEntry>,
}

#[derive(Serialize)]
struct BatchEntry {
    video_id: String,
    total_score: f64,
    grade: String,
    below_floor: bool,
}

/// Evaluate every pair in `dir`, keeping a full artifact only for videos
/// below the score floor (the ones that need attention), plus summary.json.
async fn cmd_qa_batch(
    client: &JudgeClient,
    dir: &Path,
    min_score: f64,
    max_videos: Option<usize>,
    output_dir: &Path,
) -> Result<()> {
    let mut pairs = scan_batch_pairs(dir)?;
    if let Some(limit) = max_videos {
        pairs.truncate(limit);
    }
    if pairs.is_empty() {
        println!("no analysis/transcript pairs found under {}", dir.display());
        return Ok(());
    }

    let mut summary = BatchSummary {
        evaluated: 0,
        failed: 0,
        min_score,
        results: Vec::new(),
    };

    for (video, transcript_path, analysis_path) in &pairs {
        // One bad pair must not sink the batch.
        match evaluate_one(client, video, transcript_path, analysis_path).await {
            Ok(result) => {
                summary.evaluated += 1;
                let below_floor = result.total_score < min_score;
                if below_floor {
                    write_artifact(&result, output_dir)?;
                }
                println!(
                    "{video}: {:.2} ({}){}",
                    result.total_score,
                    result.grade,
                    if below_floor { "  <- below floor" } else { "" }
                );
                summary.results.push(BatchEntry {
                    video_id: result.video_id,
                    total_score: result.total_score,
                    grade: result.grade.to_string(),
                    below_floor,
                });
            }
            Err(err) => {
                warn!(video = %video, error = %err, "evaluation failed");
                summary.failed += 1;
            }
        }
    }
    summary.results.sort_by(|a, b| {
        a.total_score
            .partial_cmp(&b.total_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let summary_path = output_dir.join("summary.json");
    std::fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    let flagged = summary.results.iter().filter(|r| r.below_floor).count();
    println!(
        "evaluated {} video(s), {} failed, {} below {:.1}; wrote {}",
        summary.evaluated,
        summary.failed,
        flagged,
        min_score,
        summary_path.display()
    );
    Ok(())
}

/// Find `<id>_analysis.md` files with a matching `<id>_transcript.txt`.
fn scan_batch_pairs(dir: &Path) -> Result<Vec<(String, PathBuf, PathBuf)>> {
    let mut pairs = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let Some(video) = name.strip_suffix("_analysis.md") else {
            continue;
        };
        let transcript = dir.join(format!("{video}_transcript.txt"));
        if transcript.is_file() {
            pairs.push((video.to_string(), transcript, entry.path()));
        } else {
            warn!(video = %video, "analysis has no matching transcript, skipping");
        }
    }
    pairs.sort();
    Ok(pairs)
}

/// Aggregate artifacts into reports and print summary statistics.
fn cmd_report(dir: &Path, csv: Option<&Path>, html: Option<&Path>) -> Result<()> {
    let results = load_results(dir)?;
    if results.is_empty() {
        println!("no QA artifacts found under {}", dir.display());
        return Ok(());
    }
    if let Some(path) = csv {
        write_csv(&results, path)?;
        println!("wrote {}", path.display());
    }
    if let Some(path) = html {
        write_html(&results, path)?;
        println!("wrote {}", path.display());
    }
    println!("{}", SummaryStats::compute(&results).render_text());
    Ok(())
}

/// Public video ids (YouTube) are short; anything longer is taken to be a
/// store-side UUID already.
const PUBLIC_VIDEO_ID_MAX_CHARS: usize = 20;

/// Persist every artifact in `dir` whose video can be resolved.
async fn cmd_save_db(ledger: &dyn QaLedger, dir: &Path) -> Result<()> {
    let results = load_results(dir)?;
    let mut saved = 0usize;
    let mut skipped = 0usize;
    for result in &results {
        let uuid = if result.video_id.len() > PUBLIC_VIDEO_ID_MAX_CHARS {
            Some(result.video_id.clone())
        } else {
            ledger.resolve_video_uuid(&result.video_id).await?
        };
        match uuid {
            Some(uuid) => {
                ledger
                    .save_evaluation(&result.to_evaluation_record(&uuid))
                    .await?;
                saved += 1;
            }
            None => {
                warn!(video = %result.video_id, "video not registered, skipping");
                skipped += 1;
            }
        }
    }
    println!("saved {saved} evaluation(s), skipped {skipped} unregistered video(s)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use vigil_store::{MemoryRecord, MemoryStoreFake, QaLedgerFake};

    fn aged_record(id: &str, days_ago: i64) -> MemoryRecord {
        MemoryRecord {
            id: id.to_string(),
            user_id: "agent".to_string(),
            memory: format!("note {id}"),
            created_at: Some((Utc::now() - Duration::days(days_ago)).to_rfc3339()),
            updated_at: None,
            metadata: json!({}),
        }
    }

    #[tokio::test]
    async fn test_cmd_decay_dry_run_leaves_store_untouched() {
        let store = MemoryStoreFake::new();
        store.insert_raw(aged_record("fresh", 1));
        store.insert_raw(aged_record("stale", 120));

        cmd_decay(&store, "agent", &DecayParams::default(), true)
            .await
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_cmd_decay_cleanup_prunes_only_stale_records() {
        let store = MemoryStoreFake::new();
        store.insert_raw(aged_record("fresh", 1));
        store.insert_raw(aged_record("stale", 120));

        cmd_decay(&store, "agent", &DecayParams::default(), false)
            .await
            .unwrap();
        assert!(store.contains("fresh"));
        assert!(!store.contains("stale"));
    }

    #[tokio::test]
    async fn test_cmd_decay_fails_when_listing_fails() {
        let store = MemoryStoreFake::new();
        store.fail_listing();
        let result = cmd_decay(&store, "agent", &DecayParams::default(), true).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_cmd_import_chunks_memory_md() {
        let dir = tempfile::tempdir().unwrap();
        let ws = WorkspacePaths::new(dir.path());
        std::fs::write(
            ws.memory_md(),
            "# Memory\n\nfirst durable fact worth keeping around\n\nsecond durable fact worth keeping around\n",
        )
        .unwrap();

        let store = MemoryStoreFake::new();
        cmd_import(&store, &ws, "agent", ImportMode::MemoryOnly, 400)
            .await
            .unwrap();

        let records = store.list_all("agent").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].metadata["source"], "MEMORY.md");
    }

    #[tokio::test]
    async fn test_cmd_import_daily_takes_newest_notes_first() {
        let dir = tempfile::tempdir().unwrap();
        let ws = WorkspacePaths::new(dir.path());
        std::fs::create_dir(ws.memory_dir()).unwrap();
        std::fs::write(
            ws.memory_dir().join("2026-08-29.md"),
            "yesterday's note with enough text to survive chunking\n",
        )
        .unwrap();
        std::fs::write(
            ws.memory_dir().join("2026-08-01.md"),
            "an old note with enough text to survive chunking\n",
        )
        .unwrap();

        let store = MemoryStoreFake::new();
        cmd_import(&store, &ws, "agent", ImportMode::Daily(1), 400)
            .await
            .unwrap();

        let records = store.list_all("agent").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].metadata["source"], "2026-08-29.md");
    }

    #[tokio::test]
    async fn test_cmd_import_tolerates_missing_memory_md() {
        let dir = tempfile::tempdir().unwrap();
        let ws = WorkspacePaths::new(dir.path());
        let store = MemoryStoreFake::new();
        cmd_import(&store, &ws, "agent", ImportMode::MemoryOnly, 400)
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_cmd_save_db_skips_unregistered_videos() {
        let dir = tempfile::tempdir().unwrap();
        let dims = {
            let mut d = vigil_core::qa::score::DimensionScores::default();
            d.accuracy.score = 8.0;
            d
        };
        let known = QaResult::assemble("known", "judge", &dims, vec![], vec![], 1.0, None);
        let unknown = QaResult::assemble("unknown", "judge", &dims, vec![], vec![], 1.0, None);
        std::fs::write(
            dir.path().join("known_qa.json"),
            serde_json::to_string(&known).unwrap(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("unknown_qa.json"),
            serde_json::to_string(&unknown).unwrap(),
        )
        .unwrap();

        let ledger = QaLedgerFake::new();
        ledger.register_video("known", "11111111-2222-3333-4444-555555555555");

        cmd_save_db(&ledger, dir.path()).await.unwrap();
        assert_eq!(ledger.saved_count(), 1);
    }

    #[test]
    fn test_decay_flags_reject_out_of_range_values() {
        assert!(Cli::try_parse_from(["vigil", "decay", "--half-life=-5"]).is_err());
        assert!(Cli::try_parse_from(["vigil", "decay", "--half-life=0"]).is_err());
        assert!(Cli::try_parse_from(["vigil", "decay", "--threshold=1.5"]).is_err());
        assert!(Cli::try_parse_from(["vigil", "decay", "--threshold=0"]).is_err());
        assert!(Cli::try_parse_from(["vigil", "decay", "--half-life=45", "--threshold=0.2"]).is_ok());
    }

    #[test]
    fn test_scan_batch_pairs_requires_both_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("vid1_analysis.md"), "a").unwrap();
        std::fs::write(dir.path().join("vid1_transcript.txt"), "t").unwrap();
        std::fs::write(dir.path().join("vid2_analysis.md"), "a").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let pairs = scan_batch_pairs(dir.path()).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0, "vid1");
    }

    #[test]
    fn test_cmd_report_writes_csv_and_html() {
        let dir = tempfile::tempdir().unwrap();
        let dims = {
            let mut d = vigil_core::qa::score::DimensionScores::default();
            for dim in vigil_core::qa::score::Dimension::ALL {
                d.get_mut(dim).score = 6.0;
            }
            d
        };
        let result = QaResult::assemble("vid", "judge", &dims, vec![], vec![], 1.0, None);
        std::fs::write(
            dir.path().join("vid_qa.json"),
            serde_json::to_string(&result).unwrap(),
        )
        .unwrap();

        let csv_path = dir.path().join("report.csv");
        let html_path = dir.path().join("report.html");
        cmd_report(dir.path(), Some(&csv_path), Some(&html_path)).unwrap();

        let csv = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv.lines().count() == 2);
        assert!(csv.contains("vid,6.00,C"));
        assert!(std::fs::read_to_string(&html_path)
            .unwrap()
            .contains("<!DOCTYPE html>"));
    }
}
