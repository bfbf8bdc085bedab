//! Link whole annotation sets and write the report.

use std::io;

use ontolink_core::AnnotatedDoc;

use crate::error::Result;
use crate::linker::{LinkDecision, Linker, MatchMethod};
use crate::report::{ReportRow, ReportWriter};

/// Documents between progress log lines.
pub const PROGRESS_INTERVAL: usize = 500;

/// Counters from one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Documents processed.
    pub documents: usize,
    /// Mentions processed.
    pub mentions: usize,
    /// Mentions linked by exact normalized-label match.
    pub exact: usize,
    /// Mentions linked by similarity.
    pub similarity: usize,
    /// Mentions left unlinked.
    pub unlinked: usize,
    /// Similarity decisions answered from the memo.
    pub memo_hits: u64,
}

impl BatchStats {
    /// Linked mentions, either way.
    #[must_use]
    pub fn linked(&self) -> usize {
        self.exact + self.similarity
    }

    fn record(&mut self, decision: &LinkDecision) {
        self.mentions += 1;
        match decision.method() {
            Some(MatchMethod::Exact) => self.exact += 1,
            Some(MatchMethod::Similarity) => self.similarity += 1,
            None => self.unlinked += 1,
        }
    }
}

/// Link every annotation of every document, in order, writing one report
/// row per mention. Unlinked mentions are written with `NONE` markers
/// unless `ignore_unlinked` is set.
///
/// # Errors
///
/// Only report write failures; linking itself cannot fail.
pub fn link_documents<W: io::Write>(
    linker: &Linker,
    docs: &[AnnotatedDoc],
    report: &mut ReportWriter<W>,
    ignore_unlinked: bool,
) -> Result<BatchStats> {
    let mut stats = BatchStats::default();
    let hits_before = linker.memo().stats().hits;

    for (i, doc) in docs.iter().enumerate() {
        if i % PROGRESS_INTERVAL == 0 {
            log::info!("processing document {}/{}", i, docs.len());
        }
        for annotation in &doc.annotations {
            let decision = linker.link(&annotation.mention());
            stats.record(&decision);
            if decision.is_match() || !ignore_unlinked {
                report.write_row(&ReportRow::new(annotation, decision.record()))?;
            }
        }
        stats.documents += 1;
    }
    report.flush()?;

    // the memo may be cleared from another thread mid-batch
    stats.memo_hits = linker.memo().stats().hits.saturating_sub(hits_before);
    log::info!(
        "linked {}/{} mentions ({} exact, {} similarity, {} memo hits) in {} documents",
        stats.linked(),
        stats.mentions,
        stats.exact,
        stats.similarity,
        stats.memo_hits,
        stats.documents
    );
    Ok(stats)
}
