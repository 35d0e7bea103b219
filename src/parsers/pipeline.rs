//! Bounded parallel extraction
//!
//! A producer feeds files into a bounded channel and at most
//! `max_workers` threads scan them. Each worker appends its result to a
//! shared list behind a mutex; the lock only serialises the append.
//!
//! ```text
//!   files ──► [bounded channel] ──► worker 1..N ──► Mutex<Vec<ParsedFile>>
//! ```
//!
//! A file that cannot be read is logged and skipped; sibling workers keep
//! going. A worker that panics is logged and counted, and the files it had
//! not reached yet are picked up by the others. The collected files are sorted by relative path so that every
//! later pass sees them in a stable order.

use super::LanguageParser;
use crate::models::{FileInfo, ParsedFile};
use crate::progress::ProgressSink;
use crossbeam_channel::bounded;
use std::sync::Mutex;
use std::thread;
use tracing::{debug, warn};

/// Concurrency ceiling when none is configured
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;

/// Stats from a single worker
#[derive(Debug, Default)]
struct WorkerStats {
    parsed: usize,
    errors: usize,
}

/// Combined stats from an extraction run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExtractionStats {
    pub total_files: usize,
    pub parsed_files: usize,
    pub read_errors: usize,
    pub workers: usize,
    pub failed_workers: usize,
}

/// Scan `files` with at most `max_workers` concurrent extractions
pub fn extract_files(
    parser: &dyn LanguageParser,
    files: &[FileInfo],
    max_workers: usize,
    progress: &dyn ProgressSink,
) -> (Vec<ParsedFile>, ExtractionStats) {
    let workers = max_workers.max(1).min(files.len().max(1));
    let collected = Mutex::new(Vec::with_capacity(files.len()));

    let (file_tx, file_rx) = bounded::<&FileInfo>(workers * 2);

    let mut failed_workers = 0;
    let worker_stats: Vec<WorkerStats> = thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);

        for _ in 0..workers {
            let rx = file_rx.clone();
            let collected = &collected;

            handles.push(scope.spawn(move || {
                let mut stats = WorkerStats::default();

                for file in rx {
                    match parser.parse_file(file) {
                        Ok(parsed) => {
                            stats.parsed += 1;
                            collected
                                .lock()
                                .expect("result lock poisoned: a worker panicked while appending")
                                .push(parsed);
                        }
                        Err(e) => {
                            stats.errors += 1;
                            warn!("Failed to parse {}: {}", file.relative_path, e);
                        }
                    }
                    progress.update(1);
                }

                stats
            }));
        }

        // Workers detect the end of input once every sender is gone
        drop(file_rx);
        for file in files {
            if file_tx.send(file).is_err() {
                break;
            }
        }
        drop(file_tx);

        let mut finished = Vec::with_capacity(handles.len());
        for (worker, handle) in handles.into_iter().enumerate() {
            match handle.join() {
                Ok(stats) => finished.push(stats),
                Err(_) => {
                    failed_workers += 1;
                    warn!("Extraction worker {} panicked; its counts are lost", worker);
                }
            }
        }
        finished
    });

    progress.finish();

    let mut stats = ExtractionStats {
        total_files: files.len(),
        workers,
        failed_workers,
        ..Default::default()
    };
    for worker in &worker_stats {
        stats.parsed_files += worker.parsed;
        stats.read_errors += worker.errors;
    }

    // A worker that panicked outside the append leaves the list intact
    let mut parsed = collected.into_inner().unwrap_or_else(|e| e.into_inner());
    parsed.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    debug!(
        "Extracted {}/{} files with {} workers ({} read errors, {} failed workers)",
        stats.parsed_files, stats.total_files, stats.workers, stats.read_errors, stats.failed_workers
    );

    (parsed, stats)
}
