//! facfind doctor - Check search artifacts and the store

use clap::Args;
use colored::Colorize;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::emit_json;
use crate::error::Result;
use crate::storage::FacultyStore;

#[derive(Args, Debug)]
pub struct DoctorArgs {}

#[derive(Debug, Default, Serialize)]
struct DoctorReport {
    config_path: Option<String>,
    artifacts_dir: Option<String>,
    semantic_available: bool,
    records: usize,
    index_rows: Option<usize>,
    embedder: Option<String>,
    dims: Option<usize>,
    store_path: Option<String>,
    store_rows: Option<usize>,
    store_error: Option<String>,
    issues: Vec<String>,
}

pub fn run(ctx: &AppContext, _args: &DoctorArgs) -> Result<()> {
    let report = diagnose(ctx);

    if ctx.is_json() {
        return emit_json(&report);
    }

    println!("{}", "facfind doctor - Health Checks".bold());
    println!();

    match &report.artifacts_dir {
        Some(dir) => ok(&format!("Search artifacts found in {dir}")),
        None => fail("No search artifacts found (faculty.index + metadata.json)"),
    }
    if report.semantic_available {
        ok(&format!(
            "Semantic search ready: {} records, {} embedder ({} dims)",
            report.records,
            report.embedder.as_deref().unwrap_or("?"),
            report.dims.unwrap_or_default()
        ));
    } else {
        fail("Semantic search unavailable; queries use the store fallback");
    }

    match (&report.store_path, report.store_rows) {
        (Some(path), Some(rows)) => ok(&format!("Store {path} opened ({rows} rows)")),
        _ => fail(&format!(
            "Store unavailable: {}",
            report.store_error.as_deref().unwrap_or("unknown error")
        )),
    }

    println!();
    if report.issues.is_empty() {
        println!("{} No issues found", "✓".green().bold());
    } else {
        println!(
            "{} {} issue(s) found",
            "!".yellow().bold(),
            report.issues.len()
        );
        if ctx.verbosity > 0 {
            for issue in &report.issues {
                println!("  - {issue}");
            }
        }
    }
    Ok(())
}

fn diagnose(ctx: &AppContext) -> DoctorReport {
    let mut report = DoctorReport {
        config_path: ctx.config_path.as_ref().map(|p| p.display().to_string()),
        ..Default::default()
    };

    let loader = ctx.engine.loader();
    report.artifacts_dir = loader.locate().map(|dir| dir.display().to_string());

    let bundle = loader.ensure_loaded();
    report.semantic_available = bundle.is_available();
    report.records = bundle.metadata.len();
    report.index_rows = bundle.index.as_ref().map(crate::search::FlatIndex::len);
    report.embedder = bundle.embedder.as_ref().map(|e| e.name().to_string());
    report.dims = bundle.embedder.as_ref().map(|e| e.dims());

    if report.artifacts_dir.is_none() {
        report.issues.push("search artifacts not found".to_string());
    } else if !report.semantic_available {
        report
            .issues
            .push("search artifacts present but failed to load".to_string());
    }

    match ctx.open_store() {
        Ok(store) => {
            report.store_path = Some(store.path().display().to_string());
            match store.count() {
                Ok(rows) => report.store_rows = Some(rows),
                Err(err) => {
                    report.store_error = Some(err.to_string());
                    report.issues.push("store query failed".to_string());
                }
            }
        }
        Err(err) => {
            report.store_path = FacultyStore::locate(&ctx.config.store)
                .map(|path| path.display().to_string());
            report.store_error = Some(err.to_string());
            report.issues.push("store unavailable".to_string());
        }
    }

    if let Some(rows) = report.store_rows {
        if report.semantic_available && rows != report.records {
            report.issues.push(format!(
                "store has {rows} rows but the index covers {} records",
                report.records
            ));
        }
    }

    report
}

fn ok(message: &str) {
    println!("{} {message}", "✓".green());
}

fn fail(message: &str) {
    println!("{} {message}", "✗".red());
}
