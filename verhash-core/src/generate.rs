use crossbeam_channel::Sender;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::cancel::CancelToken;
use crate::digest::{digest_or_error, is_error_digest};
use crate::error::GenError;
use crate::manifest::{ManifestEntry, ManifestWriter};
use crate::progress::{Event, Outcome, ScanProgress};
use crate::request::Job;
use crate::walk::{rel_path, FileWalker};

/// Body of the worker: count, hash, write, and report through `sink`.
///
/// Always finishes by sending exactly one terminal event that matches the
/// returned [`Outcome`]. A dropped receiver does not stop the run; the
/// manifest on disk is the product.
pub fn run(job: &Job, sink: &Sender<Event>, cancel: &CancelToken) -> Outcome {
    run_then(job, sink, cancel, |_| {})
}

/// [`run`], calling `before_terminal` with the outcome just before the
/// terminal event is sent.
pub(crate) fn run_then(
    job: &Job,
    sink: &Sender<Event>,
    cancel: &CancelToken,
    before_terminal: impl FnOnce(&Outcome),
) -> Outcome {
    let emit = |ev: Event| {
        let _ = sink.send(ev);
    };
    let outcome = match scan(job, &emit, cancel) {
        Ok(outcome) => outcome,
        Err(e) => {
            let message = format!("Error creating hash file: {e}");
            warn!(output = ?job.output, error = %e, "manifest run failed");
            emit(Event::warn(message.clone()));
            Outcome::Failed { message }
        }
    };
    before_terminal(&outcome);
    emit(match &outcome {
        Outcome::Completed { entry_count } => {
            Event::Success { entry_count: *entry_count, output: job.output.clone() }
        }
        Outcome::Failed { message } => Event::Failure { message: message.clone() },
        Outcome::Cancelled { entries_written } => {
            Event::Cancelled { entries_written: *entries_written }
        }
    });
    outcome
}

fn scan(job: &Job, emit: &impl Fn(Event), cancel: &CancelToken) -> Result<Outcome, GenError> {
    info!(root = ?job.root, output = ?job.output, "starting manifest run");
    emit(Event::info("--- Starting hash generation ---"));

    let mut writer =
        ManifestWriter::create(&job.output).map_err(|e| GenError::io(&job.output, e))?;
    let walker = FileWalker::new(&job.root).skipping_output(&job.output);

    // 1) Count pass
    let total = walker.count();
    emit(Event::info(format!("Found {total} files to process across all subdirectories")));
    emit(Event::Progress(ScanProgress { processed: 0, total, current_file: String::new() }));

    // 2) Hash pass, same walk order; one line per file, written through
    let mut processed = 0usize;
    for path in walker.files() {
        if cancel.is_cancelled() {
            info!(processed, total, "manifest run cancelled");
            emit(Event::info(format!("Cancelled after {processed}/{total} files")));
            return Ok(Outcome::Cancelled { entries_written: writer.entries() });
        }
        let entry = ManifestEntry {
            rel_path: rel_path(&job.root, &path),
            digest: digest_or_error(&path),
        };
        if is_error_digest(&entry.digest) {
            warn!(path = ?path, digest = %entry.digest, "unreadable file recorded as error");
            emit(Event::warn(format!("{}: {}", entry.rel_path, entry.digest)));
        } else {
            debug!(path = %entry.rel_path, digest = %entry.digest, "hashed");
        }
        writer.append(&entry).map_err(|e| GenError::io(writer.path(), e))?;
        processed += 1;
        emit(Event::info(format!(
            "Progress: {processed}/{total} files processed - {}: {}",
            base_name(&path),
            entry.digest
        )));
        emit(Event::Progress(ScanProgress { processed, total, current_file: entry.rel_path }));
    }
    if processed != total {
        warn!(processed, total, "tree changed between count and hash passes");
    }

    // 3) Trailing version line
    let entry_count =
        writer.finish(&job.version_line).map_err(|e| GenError::io(&job.output, e))?;
    emit(Event::info(format!("Added Version: {}", job.version_line)));
    emit(Event::info(format!(
        "Hash file '{}' created successfully with {entry_count} entries.",
        job.output.display()
    )));
    info!(entry_count, output = ?job.output, "manifest written");
    Ok(Outcome::Completed { entry_count })
}

fn base_name(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}
