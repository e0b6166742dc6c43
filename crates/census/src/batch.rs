use anyhow::Result;
use extract::{ExtractedRecord, Extractor};
use ingest::PageText;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::PageScope;
use crate::dedup::Deduplicator;
use crate::metrics::{Metrics, TimedOperation};

/// What happened to one input document.
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub path: PathBuf,
    pub records: usize,
    pub error: Option<String>,
}

#[derive(Debug)]
pub struct BatchResult {
    /// Deduplicated records, in document and page order.
    pub records: Vec<ExtractedRecord>,
    pub outcomes: Vec<DocumentOutcome>,
}

/// Runs documents through the extractor one at a time, in order.
pub struct BatchProcessor<'a> {
    extractor: &'a Extractor,
    scope: PageScope,
    metrics: Arc<Metrics>,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(extractor: &'a Extractor, scope: PageScope, metrics: Arc<Metrics>) -> Self {
        Self {
            extractor,
            scope,
            metrics,
        }
    }

    /// Process every document. A document that cannot be read is reported in
    /// its outcome and the batch carries on with the next one.
    pub async fn run(&self, documents: &[PathBuf]) -> BatchResult {
        let mut records = Vec::new();
        let mut outcomes = Vec::with_capacity(documents.len());

        for path in documents {
            match self.process_document(path).await {
                Ok(doc_records) => {
                    self.metrics.record_document(true);
                    info!(document = ?path, records = doc_records.len(), "Document processed");
                    outcomes.push(DocumentOutcome {
                        path: path.clone(),
                        records: doc_records.len(),
                        error: None,
                    });
                    records.extend(doc_records);
                }
                Err(e) => {
                    self.metrics.record_document(false);
                    warn!(document = ?path, error = %format!("{e:#}"), "Document skipped");
                    outcomes.push(DocumentOutcome {
                        path: path.clone(),
                        records: 0,
                        error: Some(format!("{e:#}")),
                    });
                }
            }
        }

        BatchResult {
            records: self.deduplicate(records),
            outcomes,
        }
    }

    fn deduplicate(&self, records: Vec<ExtractedRecord>) -> Vec<ExtractedRecord> {
        let (records, dropped) = Deduplicator::new().dedup(records);
        self.metrics.record_duplicates(dropped);
        if dropped > 0 {
            info!(dropped, "Duplicate records removed");
        }
        records
    }

    pub async fn process_document(&self, path: &Path) -> Result<Vec<ExtractedRecord>> {
        let timer = TimedOperation::start();
        let pages = ingest::ingest_file(path).await?;
        self.metrics.record_read(timer.elapsed(), pages.len());

        Ok(self.records_from_pages(&pages))
    }

    /// One record per page with text; blank pages are skipped.
    pub fn records_from_pages(&self, pages: &[PageText]) -> Vec<ExtractedRecord> {
        let limit = match self.scope {
            PageScope::AllPages => pages.len(),
            PageScope::FirstPage => 1,
        };

        pages
            .iter()
            .take(limit)
            .filter_map(|page| {
                let timer = TimedOperation::start();
                match self.extractor.extract_page(&page.text) {
                    Some(record) => {
                        self.metrics
                            .record_extract(timer.elapsed(), record.unresolved_count());
                        Some(record)
                    }
                    None => {
                        self.metrics.record_skipped_page();
                        info!(source = %page.source, page = page.page_number, "Page has no text, skipped");
                        None
                    }
                }
            })
            .collect()
    }
}
