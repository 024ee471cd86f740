//! Batch orchestration: drives the conversion worker over a set of staged
//! files with bounded concurrency and per-item failure isolation.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use webpify_core::models::{
    compression_ratio, BatchItemResult, BatchResult, ConversionRequest, SourceAsset,
};
use webpify_storage::keys;
use webpify_storage::local::remove_entry;

use crate::convert::ConversionWorker;
use crate::intake::IntakeError;

/// One submitted batch element: either a staged upload, or the intake
/// failure that kept it from being staged.
#[derive(Debug)]
pub struct BatchEntry {
    pub original_filename: String,
    pub staged: Result<SourceAsset, IntakeError>,
}

/// Runs a batch of conversions against one shared `ConversionRequest`.
///
/// Items convert concurrently, bounded by the worker-pool size. A failure on
/// one element never aborts the batch; it becomes an error item in the
/// result list. The result list is always in submission order.
pub struct BatchOrchestrator {
    worker: Arc<ConversionWorker>,
    max_concurrent: usize,
}

impl BatchOrchestrator {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            worker: Arc::new(ConversionWorker::new()),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Convert every entry, writing outputs into `output_dir`. Produces the
    /// `BatchResult` only after every element has been attempted.
    #[tracing::instrument(skip(self, entries, request), fields(batch_id = %batch_id, total = entries.len()))]
    pub async fn run_batch(
        &self,
        entries: Vec<BatchEntry>,
        request: &ConversionRequest,
        output_dir: &Path,
        batch_id: String,
    ) -> BatchResult {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let total_files = entries.len();

        let mut names = Vec::with_capacity(total_files);
        let mut handles = Vec::with_capacity(total_files);

        for entry in entries {
            names.push(entry.original_filename.clone());

            let semaphore = semaphore.clone();
            let worker = self.worker.clone();
            let request = *request;
            let output_dir = output_dir.to_path_buf();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                convert_entry(&worker, entry, &request, &output_dir).await
            }));
        }

        // Awaiting the handles in spawn order restores submission order
        // regardless of completion order.
        let mut results = Vec::with_capacity(total_files);
        for (name, handle) in names.into_iter().zip(handles) {
            match handle.await {
                Ok(item) => results.push(item),
                Err(e) => {
                    tracing::error!(error = %e, file = %name, "Batch conversion task failed");
                    results.push(BatchItemResult::failure(
                        name,
                        "Conversion task failed".to_string(),
                    ));
                }
            }
        }

        summarize(batch_id, results)
    }
}

async fn convert_entry(
    worker: &ConversionWorker,
    entry: BatchEntry,
    request: &ConversionRequest,
    output_dir: &Path,
) -> BatchItemResult {
    let source = match entry.staged {
        Ok(source) => source,
        Err(intake) => {
            return BatchItemResult::failure(entry.original_filename, intake.to_string());
        }
    };

    let output_name = source
        .path
        .file_name()
        .and_then(|n| n.to_str())
        .map(keys::webp_name_for)
        .unwrap_or_else(keys::converted_output_key);
    let dest = output_dir.join(output_name);

    match worker.convert(&source, request, &dest).await {
        Ok(asset) => BatchItemResult::success(entry.original_filename, source.size_bytes, &asset),
        Err(e) => {
            tracing::warn!(
                error = %e,
                file = %entry.original_filename,
                "Batch item conversion failed, continuing"
            );
            // Abandon the staged input; the sweeper is only a backstop.
            if let Err(cleanup_err) = remove_entry(&source.path).await {
                tracing::warn!(
                    error = %cleanup_err,
                    path = %source.path.display(),
                    "Failed to remove staged upload for failed batch item"
                );
            }
            BatchItemResult::failure(entry.original_filename, e.to_string())
        }
    }
}

/// Aggregate accounting over the ordered result list. Failed items
/// contribute zero bytes but still count toward the totals; the overall
/// ratio comes from summed bytes, never from averaging per-item ratios.
fn summarize(batch_id: String, results: Vec<BatchItemResult>) -> BatchResult {
    let total_files = results.len();
    let successful_conversions = results.iter().filter(|r| r.is_success()).count();
    let failed_conversions = total_files - successful_conversions;

    let total_original_size: u64 = results.iter().filter_map(|r| r.original_size).sum();
    let total_converted_size: u64 = results.iter().filter_map(|r| r.converted_size).sum();

    BatchResult {
        batch_id,
        total_files,
        successful_conversions,
        failed_conversions,
        total_original_size,
        total_converted_size,
        overall_compression_ratio: compression_ratio(total_original_size, total_converted_size),
        results,
    }
}
