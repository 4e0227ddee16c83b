//! Composite progress notifier that fans out to multiple notifiers.
//!
//! Used to fan classification events out to the progress bars and the
//! grouping report writer at the same time.

use super::progress::ClassificationProgress;
use ecogroup_domain::Rank;

/// A progress notifier that delegates to multiple inner notifiers.
///
/// Uses borrowed references with a lifetime parameter so both owned and
/// borrowed notifiers can be composed without wrapper types.
pub struct CompositeProgress<'a> {
    delegates: Vec<&'a dyn ClassificationProgress>,
}

impl<'a> CompositeProgress<'a> {
    pub fn new(delegates: Vec<&'a dyn ClassificationProgress>) -> Self {
        Self { delegates }
    }
}

/// Macro to delegate a method call to all inner notifiers.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        for d in &$self.delegates {
            d.$method($($arg),*);
        }
    };
}

impl ClassificationProgress for CompositeProgress<'_> {
    fn on_rank_start(&self, rank: Rank, taxa: usize, chunks: usize) {
        delegate!(self, on_rank_start, rank, taxa, chunks);
    }

    fn on_chunk_complete(&self, rank: Rank, taxa: usize, success: bool) {
        delegate!(self, on_chunk_complete, rank, taxa, success);
    }

    fn on_rank_complete(&self, rank: Rank, assigned: usize, resolved: usize) {
        delegate!(self, on_rank_complete, rank, assigned, resolved);
    }

    fn on_assignment(&self, taxon: &str, group: &str, rank: Rank) {
        delegate!(self, on_assignment, taxon, group, rank);
    }

    fn on_new_group(&self, group: &str, forced: bool) {
        delegate!(self, on_new_group, group, forced);
    }
}
