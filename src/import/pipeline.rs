//! The import pass: every parser, in resolution order, over every edge record
//!
//! Records are disjoint slices of one [`EdgeStore`], so the parallel pass hands each
//! rayon task its own `&mut [u32]` and shares only the immutable parsers.

use std::time::Instant;

use rayon::prelude::*;
use tracing::info;

use super::ImportPlan;
use crate::edges::EdgeStore;
use crate::parsers::TagParser;
use crate::reader::{ReaderWay, RelationFlags};

/// One directed edge as handed over by the reader
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeInput {
    pub way: ReaderWay,
    pub relation_flags: RelationFlags,
}

impl EdgeInput {
    pub fn new(way: ReaderWay) -> Self {
        Self {
            way,
            relation_flags: RelationFlags::default(),
        }
    }

    pub fn with_relation_flags(mut self, relation_flags: RelationFlags) -> Self {
        self.relation_flags = relation_flags;
        self
    }
}

pub struct ImportPass<'a> {
    parsers: Vec<&'a dyn TagParser>,
    words_per_edge: usize,
}

impl<'a> ImportPass<'a> {
    pub fn new(plan: &'a ImportPlan) -> Self {
        Self {
            parsers: plan.parsers.iter().map(|(_, p)| p.as_ref()).collect(),
            words_per_edge: plan.lookup.words_per_edge(),
        }
    }

    /// Run every parser on one record
    #[inline]
    pub fn handle(&self, edge_id: u32, record: &mut [u32], edge: &EdgeInput) {
        for parser in &self.parsers {
            parser.handle_way_tags(edge_id, record, &edge.way, &edge.relation_flags);
        }
    }

    pub fn run(&self, edges: &[EdgeInput]) -> EdgeStore {
        let start = Instant::now();
        let mut store = EdgeStore::new(self.words_per_edge, edges.len());
        for (i, edge) in edges.iter().enumerate() {
            if let Some(record) = store.record_mut(i) {
                self.handle(i as u32, record, edge);
            }
        }
        info!(
            edges = edges.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Import pass complete"
        );
        store
    }

    /// Same records as [`run`](Self::run), computed on the current rayon pool
    pub fn run_parallel(&self, edges: &[EdgeInput]) -> EdgeStore {
        if self.words_per_edge == 0 {
            return self.run(edges);
        }

        let start = Instant::now();
        let mut store = EdgeStore::new(self.words_per_edge, edges.len());
        store
            .as_words_mut()
            .par_chunks_mut(self.words_per_edge)
            .zip(edges.par_iter())
            .enumerate()
            .for_each(|(i, (record, edge))| self.handle(i as u32, record, edge));
        info!(
            edges = edges.len(),
            threads = rayon::current_num_threads(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Parallel import pass complete"
        );
        store
    }
}
