//! Ingestion orchestrator: drives extraction and the sink across a batch
//! of files while streaming progress events.

use crate::extract::PageExtractor;
use crate::ingest::types::{IngestionEvent, RawDocument};
use crate::metrics::IngestMetrics;
use crate::sink::{ContentUnit, VectorSink};
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Abstraction over the ingestion pipeline used by the HTTP surface.
pub trait IngestApi: Send + Sync {
    /// Ingest a batch of files, returning the live event stream.
    ///
    /// The stream is consumed by exactly one subscriber and is not
    /// replayable; it ends right after the `JobComplete` event.
    fn ingest(
        &self,
        files: Vec<RawDocument>,
        owner: Option<String>,
    ) -> BoxStream<'static, IngestionEvent>;
}

/// Default orchestrator wiring the extractor, sink, and metrics together.
pub struct IngestService {
    extractor: Arc<dyn PageExtractor>,
    sink: Arc<dyn VectorSink>,
    metrics: Arc<IngestMetrics>,
    heartbeat: Duration,
}

impl IngestService {
    /// Build an orchestrator with the given collaborators and heartbeat
    /// period.
    pub fn new(
        extractor: Arc<dyn PageExtractor>,
        sink: Arc<dyn VectorSink>,
        metrics: Arc<IngestMetrics>,
        heartbeat: Duration,
    ) -> Self {
        Self {
            extractor,
            sink,
            metrics,
            heartbeat,
        }
    }
}

impl IngestApi for IngestService {
    fn ingest(
        &self,
        files: Vec<RawDocument>,
        owner: Option<String>,
    ) -> BoxStream<'static, IngestionEvent> {
        let extractor = self.extractor.clone();
        let sink = self.sink.clone();
        let metrics = self.metrics.clone();
        let heartbeat = self.heartbeat;
        let started = Instant::now();
        let total_files = files.len();

        // Progress producer. Chunk totals accumulate per call; nothing is
        // shared across ingestion runs.
        let (tx, mut rx) = mpsc::channel::<IngestionEvent>(16);
        tokio::spawn(async move {
            let mut total_chunks = 0usize;
            let mut processed_files = 0usize;

            for file in files {
                let filename = file.filename.clone();
                tracing::info!(file = %filename, "Processing file");

                let event = match process_file(extractor.clone(), &sink, file, owner.clone()).await
                {
                    Ok(outcome) => {
                        total_chunks += outcome.chunks;
                        processed_files += 1;
                        metrics.record_file(outcome.chunks as u64);
                        IngestionEvent::FileDone {
                            file: filename,
                            language: outcome.script,
                            progress_percent: progress(processed_files, total_files),
                            chunks: outcome.chunks,
                        }
                    }
                    Err(message) => {
                        tracing::error!(file = %filename, error = %message, "Failed to process file");
                        IngestionEvent::Error {
                            file: filename.clone(),
                            message: format!("Failed to process {filename}: {message}"),
                        }
                    }
                };

                // A closed channel means the subscriber abandoned the
                // stream; stop before touching the next file.
                if tx.send(event).await.is_err() {
                    tracing::debug!("Ingestion stream abandoned; stopping batch");
                    return;
                }
            }

            let _ = tx
                .send(IngestionEvent::JobComplete {
                    status: "success".into(),
                    total_chunks,
                    elapsed: started.elapsed().as_secs(),
                })
                .await;
        });

        // Fan-in of progress events and the independent heartbeat source.
        // The merged stream closes once the terminal event has been
        // yielded; the heartbeat is simply dropped with it.
        let stream = async_stream::stream! {
            let mut ticker = tokio::time::interval_at(
                tokio::time::Instant::now() + heartbeat,
                heartbeat,
            );
            loop {
                tokio::select! {
                    received = rx.recv() => match received {
                        Some(event) => {
                            let terminal = event.is_terminal();
                            yield event;
                            if terminal {
                                break;
                            }
                        }
                        None => break,
                    },
                    _ = ticker.tick() => yield IngestionEvent::Heartbeat,
                }
            }
        };

        stream.boxed()
    }
}

struct FileOutcome {
    chunks: usize,
    script: crate::extract::ScriptTag,
}

/// Extract one file on a blocking thread, blank-filter its pages, and hand
/// the resulting content units to the sink in a single call.
async fn process_file(
    extractor: Arc<dyn PageExtractor>,
    sink: &Arc<dyn VectorSink>,
    file: RawDocument,
    owner: Option<String>,
) -> Result<FileOutcome, String> {
    let filename = file.filename.clone();
    let extracted = tokio::task::spawn_blocking(move || {
        extractor.extract(&file.bytes, &file.filename)
    })
    .await
    .map_err(|join_error| format!("extraction task failed: {join_error}"))?
    .map_err(|error| error.to_string())?;

    let units: Vec<ContentUnit> = extracted
        .pages
        .iter()
        .filter(|page| !page.trim().is_empty())
        .map(|page| ContentUnit {
            text: page.clone(),
            filename: filename.clone(),
            language: extracted.script,
            owner: owner.clone(),
        })
        .collect();
    let chunks = units.len();

    sink.accept(units).await.map_err(|error| error.to_string())?;

    Ok(FileOutcome {
        chunks,
        script: extracted.script,
    })
}

fn progress(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed as f64) * 100.0 / (total as f64)).round() as u8
}
