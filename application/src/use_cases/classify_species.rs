//! Classify species use case
//!
//! Walks the taxonomy top-down, one rank at a time. Pending taxa of a rank
//! are sent to the classifier in chunks of siblings. A taxon either lands in
//! a functional group together with its whole subtree, or comes back as
//! RESOLVE and its children are asked about at the next rank.
//!
//! State is checkpointed after every rank, so a rerun skips taxa that were
//! already placed.

use crate::config::ClassificationParams;
use crate::ports::checkpoint::{CheckpointError, CheckpointStore};
use crate::ports::classifier::{Classifier, ClassifierError};
use crate::ports::progress::{ClassificationProgress, NoProgress};
use ecogroup_domain::{
    Checkpoint, ClassificationRequest, ClassificationResponse, Rank, ReferenceGroupRegistry,
    TaxonNode, Verdict,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ClassifySpeciesError {
    #[error("Reference group registry is empty")]
    EmptyRegistry,

    #[error("Classification failed at {rank} for [{taxa}]: {source}")]
    Classifier {
        rank: Rank,
        taxa: String,
        #[source]
        source: ClassifierError,
    },

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("Classification task failed: {0}")]
    TaskFailed(String),
}

/// Input for the ClassifySpecies use case
#[derive(Debug, Clone)]
pub struct ClassifySpeciesInput {
    /// Root of the species hierarchy.
    pub hierarchy: TaxonNode,
    /// Groups the classifier may choose from.
    pub registry: ReferenceGroupRegistry,
    pub params: ClassificationParams,
}

impl ClassifySpeciesInput {
    pub fn new(hierarchy: TaxonNode, registry: ReferenceGroupRegistry) -> Self {
        Self {
            hierarchy,
            registry,
            params: ClassificationParams::default(),
        }
    }

    pub fn with_params(mut self, params: ClassificationParams) -> Self {
        self.params = params;
        self
    }
}

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationSummary {
    pub oracle_calls: usize,
    /// Taxa placed into a group during this run.
    pub assigned: usize,
    /// Taxa answered with RESOLVE.
    pub resolved: usize,
    /// Taxa skipped because an earlier run placed them.
    pub skipped: usize,
    /// Taxa that ended the run without a usable verdict.
    pub unresolved: Vec<String>,
    /// Groups added to the registry.
    pub new_groups: Vec<String>,
    /// Groups diverted to the extra store under force grouping.
    pub extra_groups: Vec<String>,
    pub detritus_added: bool,
}

#[derive(Debug, Clone)]
pub struct ClassifySpeciesOutput {
    pub checkpoint: Checkpoint,
    /// Registry after novel groups were committed.
    pub registry: ReferenceGroupRegistry,
    pub summary: ClassificationSummary,
}

/// Siblings sent in one classifier call.
#[derive(Debug, Clone)]
struct Chunk {
    parent: Vec<String>,
    taxa: Vec<String>,
    leaf_rank: bool,
}

/// Use case for grouping a species hierarchy
pub struct ClassifySpeciesUseCase<C: Classifier + 'static, S: CheckpointStore> {
    classifier: Arc<C>,
    store: Arc<S>,
}

impl<C: Classifier + 'static, S: CheckpointStore> ClassifySpeciesUseCase<C, S> {
    pub fn new(classifier: Arc<C>, store: Arc<S>) -> Self {
        Self { classifier, store }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: ClassifySpeciesInput,
    ) -> Result<ClassifySpeciesOutput, ClassifySpeciesError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: ClassifySpeciesInput,
        progress: &dyn ClassificationProgress,
    ) -> Result<ClassifySpeciesOutput, ClassifySpeciesError> {
        let ClassifySpeciesInput {
            hierarchy,
            mut registry,
            params,
        } = input;

        if registry.is_empty() {
            return Err(ClassifySpeciesError::EmptyRegistry);
        }

        let mut checkpoint = self.store.load().await?;
        let mut summary = ClassificationSummary::default();

        info!(
            "Classifying {} species against {} reference groups ({} taxa already processed)",
            hierarchy.leaf_count(),
            registry.len(),
            checkpoint.processed.len()
        );

        let mut frontier: Vec<Vec<String>> = vec![Vec::new()];

        for rank in Rank::ALL {
            if frontier.is_empty() {
                break;
            }

            let (chunks, mut next_frontier) =
                plan_rank(&hierarchy, &frontier, &checkpoint, &params, &mut summary);

            if chunks.is_empty() {
                debug!("Nothing pending at {}", rank);
                frontier = next_frontier;
                continue;
            }

            let taxa_count = chunks.iter().map(|c| c.taxa.len()).sum();
            info!(
                "{}: {} taxa in {} chunks",
                rank,
                taxa_count,
                chunks.len()
            );
            progress.on_rank_start(rank, taxa_count, chunks.len());

            let responses = self
                .classify_chunks(rank, &chunks, &registry, &params, progress)
                .await?;
            summary.oracle_calls += chunks.len();

            let mut applier = RankApplier::new(rank, &registry, params.force_grouping, progress);
            for (chunk, response) in chunks.iter().zip(&responses) {
                let Some(parent) = hierarchy.node_at(&chunk.parent) else {
                    continue;
                };
                applier.apply(parent, chunk, response, &mut checkpoint, &mut summary);
            }

            let RankApplier {
                assigned,
                resolved,
                descend,
                pending_groups,
                ..
            } = applier;
            next_frontier.extend(descend);
            for (group, description) in pending_groups {
                if registry.put(group.as_str(), description) {
                    info!("Added new group '{}' to reference groups", group);
                    progress.on_new_group(&group, false);
                    summary.new_groups.push(group);
                }
            }

            self.store.save(&checkpoint).await?;
            progress.on_rank_complete(rank, assigned, resolved);

            frontier = next_frontier;
        }

        summary.detritus_added = checkpoint.assignments.ensure_detritus();
        self.store.save(&checkpoint).await?;

        info!(
            "Classification finished: {} assigned, {} resolved, {} unresolved, {} oracle calls",
            summary.assigned,
            summary.resolved,
            summary.unresolved.len(),
            summary.oracle_calls
        );

        Ok(ClassifySpeciesOutput {
            checkpoint,
            registry,
            summary,
        })
    }

    /// Send every chunk of a rank, at most `max_concurrent_calls` at a time.
    ///
    /// Responses come back in chunk order. The first failed chunk aborts the
    /// remaining calls.
    async fn classify_chunks(
        &self,
        rank: Rank,
        chunks: &[Chunk],
        registry: &ReferenceGroupRegistry,
        params: &ClassificationParams,
        progress: &dyn ClassificationProgress,
    ) -> Result<Vec<ClassificationResponse>, ClassifySpeciesError> {
        let semaphore = Arc::new(Semaphore::new(params.effective_concurrency()));
        let mut join_set = JoinSet::new();

        for (index, chunk) in chunks.iter().enumerate() {
            let classifier = Arc::clone(&self.classifier);
            let semaphore = Arc::clone(&semaphore);
            let request = ClassificationRequest::new(chunk.taxa.clone(), rank, registry.clone())
                .with_leaf_rank(chunk.leaf_rank)
                .with_domain_context(params.research_focus.clone());

            join_set.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = classifier.classify(&request).await;
                (index, result)
            });
        }

        let mut responses: Vec<Option<ClassificationResponse>> = vec![None; chunks.len()];

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, Ok(response))) => {
                    progress.on_chunk_complete(rank, chunks[index].taxa.len(), true);
                    responses[index] = Some(response);
                }
                Ok((index, Err(e))) => {
                    warn!("Chunk {} at {} failed: {}", index, rank, e);
                    progress.on_chunk_complete(rank, chunks[index].taxa.len(), false);
                    join_set.abort_all();
                    return Err(ClassifySpeciesError::Classifier {
                        rank,
                        taxa: chunks[index].taxa.join(", "),
                        source: e,
                    });
                }
                Err(e) => {
                    join_set.abort_all();
                    return Err(ClassifySpeciesError::TaskFailed(e.to_string()));
                }
            }
        }

        Ok(responses
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect())
    }
}

/// Split the children of every frontier node into chunks.
///
/// Taxa already processed are skipped. A taxon with a processed descendant
/// was resolved by an earlier run and is descended into without asking.
fn plan_rank(
    hierarchy: &TaxonNode,
    frontier: &[Vec<String>],
    checkpoint: &Checkpoint,
    params: &ClassificationParams,
    summary: &mut ClassificationSummary,
) -> (Vec<Chunk>, Vec<Vec<String>>) {
    let mut chunks = Vec::new();
    let mut descend = Vec::new();

    for path in frontier {
        let Some(node) = hierarchy.node_at(path) else {
            warn!("Path {:?} vanished from the hierarchy", path);
            continue;
        };

        let mut pending = Vec::new();
        for (taxon, child) in node.children() {
            if checkpoint.is_processed(taxon) {
                summary.skipped += 1;
            } else if has_processed_descendant(child, checkpoint) {
                debug!("'{}' was resolved by an earlier run", taxon);
                descend.push(child_path(path, taxon));
            } else {
                pending.push(taxon.clone());
            }
        }

        for taxa in pending.chunks(params.effective_chunk_size()) {
            let leaf_rank = taxa
                .iter()
                .all(|t| node.child(t).is_some_and(TaxonNode::is_leaf));
            chunks.push(Chunk {
                parent: path.clone(),
                taxa: taxa.to_vec(),
                leaf_rank,
            });
        }
    }

    (chunks, descend)
}

fn has_processed_descendant(node: &TaxonNode, checkpoint: &Checkpoint) -> bool {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        for (name, child) in current.children() {
            if checkpoint.is_processed(name) {
                return true;
            }
            stack.push(child);
        }
    }
    false
}

fn child_path(parent: &[String], taxon: &str) -> Vec<String> {
    let mut path = parent.to_vec();
    path.push(taxon.to_string());
    path
}

/// Applies the verdicts of one rank in chunk order.
struct RankApplier<'a> {
    rank: Rank,
    registry: &'a ReferenceGroupRegistry,
    force_grouping: bool,
    progress: &'a dyn ClassificationProgress,
    /// Novel groups, committed once the rank is done. Later descriptions win.
    pending_groups: Vec<(String, String)>,
    descend: Vec<Vec<String>>,
    assigned: usize,
    resolved: usize,
}

impl<'a> RankApplier<'a> {
    fn new(
        rank: Rank,
        registry: &'a ReferenceGroupRegistry,
        force_grouping: bool,
        progress: &'a dyn ClassificationProgress,
    ) -> Self {
        Self {
            rank,
            registry,
            force_grouping,
            progress,
            pending_groups: Vec::new(),
            descend: Vec::new(),
            assigned: 0,
            resolved: 0,
        }
    }

    fn apply(
        &mut self,
        parent: &TaxonNode,
        chunk: &Chunk,
        response: &ClassificationResponse,
        checkpoint: &mut Checkpoint,
        summary: &mut ClassificationSummary,
    ) {
        for extra in response.unexpected_taxa(&chunk.taxa) {
            warn!("Ignoring verdict for unexpected taxon '{}'", extra);
        }

        for taxon in &chunk.taxa {
            let Some(node) = parent.child(taxon) else {
                continue;
            };

            match response.verdict(taxon) {
                None => {
                    warn!("No verdict for '{}' at {}", taxon, self.rank);
                    summary.unresolved.push(taxon.clone());
                }
                Some(Verdict::Resolve) if node.has_children() => {
                    debug!("'{}' resolved to {:?}", taxon, self.rank.next());
                    self.descend.push(child_path(&chunk.parent, taxon));
                    self.resolved += 1;
                    summary.resolved += 1;
                }
                Some(Verdict::Resolve) => {
                    warn!("'{}' marked RESOLVE but has no children", taxon);
                    summary.unresolved.push(taxon.clone());
                }
                Some(Verdict::Group(group)) => {
                    self.assign(&group, taxon, node, checkpoint, summary);
                }
            }
        }
    }

    fn assign(
        &mut self,
        group: &str,
        taxon: &str,
        node: &TaxonNode,
        checkpoint: &mut Checkpoint,
        summary: &mut ClassificationSummary,
    ) {
        if self.registry.contains(group) {
            checkpoint.assignments.assign(group, taxon, node.clone());
        } else if self.force_grouping {
            if !checkpoint.extra_groups.contains_group(group) {
                info!("'{}' diverted to extra group '{}'", taxon, group);
                self.progress.on_new_group(group, true);
                summary.extra_groups.push(group.to_string());
            }
            checkpoint.extra_groups.assign(group, taxon, node.clone());
        } else {
            let description = format!("AI-generated group for {}", taxon);
            match self.pending_groups.iter_mut().find(|(name, _)| name == group) {
                Some(entry) => entry.1 = description,
                None => self.pending_groups.push((group.to_string(), description)),
            }
            checkpoint.assignments.assign(group, taxon, node.clone());
        }

        checkpoint.processed.insert(taxon);
        self.assigned += 1;
        summary.assigned += 1;
        self.progress.on_assignment(taxon, group, self.rank);
    }
}
