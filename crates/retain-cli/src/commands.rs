//! Command handlers.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use retain_core::import::markdown;
use retain_core::{LearningStats, RetainConfig, ReviewService};

use crate::cli::Commands;
use crate::session::ReviewSession;

/// Run one command, writing human-readable output to stdout.
pub async fn dispatch(
    command: Commands,
    service: &ReviewService,
    tenant: &str,
    config: &RetainConfig,
) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::Import { dirs } => {
            let dirs = if dirs.is_empty() {
                config.question_dirs.clone()
            } else {
                dirs
            };
            import(service, tenant, &dirs, &mut out).await
        }
        Commands::Review => review(service, tenant, &mut out).await,
        Commands::Due => due(service, tenant, &mut out).await,
        Commands::Stats => stats(service, tenant, &mut out).await,
        Commands::Delete { id } => delete(service, tenant, &id, &mut out).await,
    }
}

pub async fn import(
    service: &ReviewService,
    tenant: &str,
    dirs: &[PathBuf],
    out: &mut impl Write,
) -> Result<()> {
    for dir in dirs {
        writeln!(out, "Scanning {}", dir.display())?;
    }
    let parsed = markdown::parse_dirs(dirs).context("failed to read question files")?;

    if parsed.is_empty() {
        writeln!(out, "No questions found. Question files look like:")?;
        writeln!(out, "\n# q\nYour question\n# a\nYour answer\n")?;
    }

    let report = service.import_batch(tenant, parsed).await;
    writeln!(
        out,
        "Imported {}, already present {}, repeated {}, failed {}",
        report.imported, report.skipped, report.duplicates, report.failed
    )?;
    for error in &report.errors {
        writeln!(out, "  error: {}", error)?;
    }

    print_stats(&service.get_stats(tenant).await?, out)
}

pub async fn review(service: &ReviewService, tenant: &str, out: &mut impl Write) -> Result<()> {
    let stats = service.get_stats(tenant).await?;
    if stats.total_questions == 0 {
        writeln!(out, "No questions yet. Run `retain import` first.")?;
        return Ok(());
    }

    let stdin = std::io::stdin();
    ReviewSession::new(service, tenant, stdin.lock(), &mut *out)
        .run()
        .await?;

    print_stats(&service.get_stats(tenant).await?, out)
}

pub async fn due(service: &ReviewService, tenant: &str, out: &mut impl Write) -> Result<()> {
    let due = service.get_due(tenant, Utc::now()).await?;
    for question in &due {
        let first_line = question.question_text.lines().next().unwrap_or_default();
        writeln!(out, "{}  {}", question.id, first_line)?;
    }
    writeln!(out, "{} question(s) due", due.len())?;
    Ok(())
}

pub async fn stats(service: &ReviewService, tenant: &str, out: &mut impl Write) -> Result<()> {
    print_stats(&service.get_stats(tenant).await?, out)
}

pub async fn delete(
    service: &ReviewService,
    tenant: &str,
    id: &str,
    out: &mut impl Write,
) -> Result<()> {
    service
        .delete_question(tenant, id)
        .await
        .with_context(|| format!("failed to delete {}", id))?;
    writeln!(out, "Deleted {}", id)?;
    print_stats(&service.get_stats(tenant).await?, out)
}

fn print_stats(stats: &LearningStats, out: &mut impl Write) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "Total questions: {}", stats.total_questions)?;
    writeln!(out, "Due for review:  {}", stats.due_questions)?;
    writeln!(out, "Total reviews:   {}", stats.total_reviews)?;
    writeln!(out, "Correct:         {}", stats.total_correct)?;
    writeln!(out, "Accuracy:        {}%", stats.accuracy)?;
    Ok(())
}
