//! kb-audit CLI: knowledge-base index, tag and link checks.
//!
//! Exit codes: `0` audit passed, `1` audit failed, `2` fatal error (malformed
//! index, unreadable root, timeout).
//!
//! Logging: set `RUST_LOG=omni_kb_audit=debug` (or pass `--verbose`) to see
//! stage logs on stderr.

#![allow(missing_docs)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use omni_kb_audit::{
    AuditOptions, AuditSettings, Deadline, TagIndex, ValidationReport, build_snapshot,
    load_index_file, load_settings, run_audit,
};

#[derive(Parser, Debug)]
#[command(
    name = "kb-audit",
    about = "Validate a tag-indexed markdown knowledge base",
    arg_required_else_help = true
)]
struct Cli {
    /// Knowledge root directory (`fragment_file` paths are relative to it).
    #[arg(
        long,
        short = 'r',
        value_name = "DIR",
        default_value = ".",
        global = true
    )]
    root: PathBuf,

    /// Index CSV path. Defaults to `<root>/<index_file>` from settings.
    #[arg(long, short = 'i', value_name = "FILE", global = true)]
    index: Option<PathBuf>,

    /// Explicit settings YAML, layered over `<root>/.kb-audit.yaml`.
    #[arg(long = "conf", short = 'c', value_name = "FILE", global = true)]
    config_file: Option<PathBuf>,

    /// Output format.
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Text, global = true)]
    output: OutputFormat,

    /// Debug logging on stderr (ignored when `RUST_LOG` is set).
    #[arg(long, short = 'v', default_value_t = false, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full audit; exits 1 when it fails.
    Check {
        /// Abort with a timeout error after this many seconds (at least 1).
        #[arg(long = "timeout-secs", value_parser = clap::value_parser!(u64).range(1..))]
        timeout_secs: Option<u64>,
        /// Worker pool size (0 = one per core).
        #[arg(long)]
        workers: Option<usize>,
    },
    /// List tags, or the fragments selected by one tag.
    Tags { tag: Option<String> },
    /// Dump every candidate cross-fragment link.
    Links,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Pretty,
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "omni_kb_audit=debug"
        } else {
            "omni_kb_audit=warn"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn emit<T: Serialize>(value: &T, output: OutputFormat) -> Result<()> {
    let rendered = match output {
        OutputFormat::Json | OutputFormat::Text => serde_json::to_string(value),
        OutputFormat::Pretty => serde_json::to_string_pretty(value),
    }
    .context("failed to serialize CLI output as JSON")?;
    println!("{rendered}");
    Ok(())
}

fn render_report_text(report: &ValidationReport) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut passed = 0_usize;
    let mut failed = 0_usize;
    let mut check = |lines: &mut Vec<String>, ok: bool, label: String| {
        if ok {
            passed += 1;
            lines.push(format!("✓ {label}"));
        } else {
            failed += 1;
            lines.push(format!("✗ {label}"));
        }
    };

    lines.push("========================================".to_string());
    lines.push("Knowledge Base Audit".to_string());
    lines.push("========================================".to_string());

    lines.push(String::new());
    lines.push("Index Structure".to_string());
    check(
        &mut lines,
        true,
        format!("index parsed: {} fragment records", report.total_fragments),
    );
    for id in &report.duplicate_ids {
        check(&mut lines, false, format!("duplicate fragment id: {id}"));
    }

    lines.push(String::new());
    lines.push("Fragment Existence".to_string());
    for file in &report.missing_fragments {
        check(&mut lines, false, format!("fragment exists: {file}"));
    }
    check(
        &mut lines,
        report.missing_fragments.is_empty(),
        "all fragments exist".to_string(),
    );
    for fragment in &report.unreadable_fragments {
        check(
            &mut lines,
            false,
            format!(
                "fragment readable: {} ({})",
                fragment.fragment_file, fragment.reason
            ),
        );
    }

    lines.push(String::new());
    lines.push("Tag Selection".to_string());
    lines.push(format!(
        "  distinct tags: {}, untagged fragments: {}",
        report.tag_coverage.distinct_tags, report.tag_coverage.untagged_fragments
    ));

    lines.push(String::new());
    lines.push("Cross-Fragment Links".to_string());
    lines.push(format!("  candidate links checked: {}", report.link_count));
    for issue in report
        .issues()
        .into_iter()
        .filter(|issue| issue.code == "unresolved_link")
    {
        check(&mut lines, false, format!("link resolves: {}", issue.message));
    }
    check(
        &mut lines,
        report.unresolved_links.is_empty(),
        "no broken cross-fragment links".to_string(),
    );

    if !report.unindexed_files.is_empty() || !report.notes.is_empty() {
        lines.push(String::new());
    }
    for file in &report.unindexed_files {
        lines.push(format!("• not referenced by the index: {file}"));
    }
    for note in &report.notes {
        lines.push(format!("• {note}"));
    }
    let warned = report.unindexed_files.len() + report.notes.len();

    lines.push(String::new());
    lines.push("========================================".to_string());
    lines.push(format!("  Passed: {passed}"));
    lines.push(format!("  Warnings: {warned}"));
    lines.push(format!("  Failed: {failed}"));
    lines.push("========================================".to_string());
    lines.push(if report.pass {
        "Knowledge base audit passed".to_string()
    } else {
        "Knowledge base audit failed".to_string()
    });
    lines.join("\n")
}

fn resolve_settings(cli: &Cli) -> Result<AuditSettings> {
    load_settings(&cli.root, cli.config_file.as_deref())
        .with_context(|| format!("failed to load settings for {}", cli.root.display()))
}

fn resolve_index_path(cli: &Cli, settings: &AuditSettings) -> PathBuf {
    cli.index
        .clone()
        .unwrap_or_else(|| cli.root.join(&settings.index_file))
}

/// Returns whether the command succeeded as an audit verdict.
fn execute(cli: &Cli) -> Result<bool> {
    let settings = resolve_settings(cli)?;
    let index_path = resolve_index_path(cli, &settings);

    match &cli.command {
        Command::Check {
            timeout_secs,
            workers,
        } => {
            let mut options = AuditOptions::from(&settings);
            if let Some(secs) = timeout_secs {
                options.timeout = Some(std::time::Duration::from_secs(*secs));
            }
            if let Some(workers) = workers {
                options.workers = *workers;
            }
            let report = run_audit(&index_path, &cli.root, &options)
                .with_context(|| format!("audit of {} failed", index_path.display()))?;
            match cli.output {
                OutputFormat::Text => println!("{}", render_report_text(&report)),
                format => emit(&report, format)?,
            }
            Ok(report.pass)
        }
        Command::Tags { tag } => {
            let loaded = load_index_file(&index_path)
                .with_context(|| format!("failed to load index {}", index_path.display()))?;
            let tags = TagIndex::build(&loaded.records);
            match tag {
                Some(tag) => {
                    let ids: Vec<String> = tags.select_by_tag(tag).into_iter().collect();
                    match cli.output {
                        OutputFormat::Text => {
                            for id in &ids {
                                println!("{id}");
                            }
                        }
                        format => {
                            let total = ids.len();
                            emit(&json!({"tag": tag, "total": total, "ids": ids}), format)?;
                        }
                    }
                }
                None => match cli.output {
                    OutputFormat::Text => {
                        for (tag, count) in tags.tags() {
                            println!("{tag}\t{count}");
                        }
                    }
                    format => {
                        let rows: Vec<_> = tags
                            .tags()
                            .map(|(tag, count)| json!({"tag": tag, "fragments": count}))
                            .collect();
                        emit(
                            &json!({"coverage": tags.coverage(), "tags": rows}),
                            format,
                        )?;
                    }
                },
            }
            Ok(true)
        }
        Command::Links => {
            let options = AuditOptions::from(&settings);
            let deadline = Deadline::start(options.timeout);
            let loaded = load_index_file(&index_path)
                .with_context(|| format!("failed to load index {}", index_path.display()))?;
            let snapshot = build_snapshot(loaded, &cli.root, &options, &deadline)
                .context("failed to scan cross-fragment links")?;
            let edges = &snapshot.links.edges;
            match cli.output {
                OutputFormat::Text => {
                    for edge in edges {
                        let status = if edge.resolved.is_some() {
                            "ok"
                        } else {
                            "unresolved"
                        };
                        println!("{} -> {} [{status}]", edge.source_id, edge.raw_target);
                    }
                }
                format => emit(&json!({"total": edges.len(), "edges": edges}), format)?,
            }
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match execute(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("kb-audit: {err:#}");
            ExitCode::from(2)
        }
    }
}
