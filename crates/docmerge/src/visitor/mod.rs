/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Visitors applied by the [`Walker`](crate::walker::Walker).
//!
//! Each visitor handles one kind of markup. The [`CompositeVisitor`] combines
//! them into the full pipeline. Loop expansion runs the full pipeline on every
//! iteration's copy of the loop body, so the loop visitor needs a handle to
//! the composite that contains it. That cycle is broken with two-phase
//! construction: the loop visitor is created against a provisional composite
//! without loop support, then bound to the final composite through a weak
//! reference once it exists.

mod conditional;
mod loops;
mod placeholder;

pub use conditional::ConditionalVisitor;
pub use loops::LoopVisitor;
pub use placeholder::PlaceholderVisitor;

use crate::context::EvaluationContext;
use crate::detect::{ConditionalBlock, LoopBlock};
use crate::error::MergeResult;
use crate::pass::Pass;
use crate::walker::RegionNode;
use docmerge_types::Run;
use std::sync::Arc;

/// Callbacks invoked by the walker. Every method defaults to "not handled".
pub trait DocumentVisitor {
    /// Resolve a top-level conditional. Returns whether the region changed.
    fn visit_conditional<N: RegionNode>(
        &self,
        _nodes: &mut Vec<N>,
        _block: &ConditionalBlock,
        _scope: &dyn EvaluationContext,
        _pass: &mut Pass<'_>,
    ) -> MergeResult<bool> {
        Ok(false)
    }

    /// Expand a top-level loop. Returns the number of nodes that replaced
    /// the loop's span, or `None` when the loop was left alone.
    fn visit_loop<N: RegionNode>(
        &self,
        _nodes: &mut Vec<N>,
        _block: &LoopBlock,
        _scope: &dyn EvaluationContext,
        _pass: &mut Pass<'_>,
    ) -> MergeResult<Option<usize>> {
        Ok(None)
    }

    /// Substitute placeholders in a window of runs. Returns the rebuilt runs,
    /// or `None` when nothing changed.
    fn visit_text(
        &self,
        _runs: &[Run],
        _scope: &dyn EvaluationContext,
        _pass: &mut Pass<'_>,
    ) -> MergeResult<Option<Vec<Run>>> {
        Ok(None)
    }
}

/// The full pipeline: conditionals, loops and placeholders.
pub struct CompositeVisitor {
    conditionals: ConditionalVisitor,
    loops: Option<LoopVisitor>,
    placeholders: PlaceholderVisitor,
}

impl CompositeVisitor {
    /// A composite without loop support.
    fn provisional() -> Self {
        Self {
            conditionals: ConditionalVisitor,
            loops: None,
            placeholders: PlaceholderVisitor,
        }
    }

    /// Build the full pipeline.
    pub fn build() -> Arc<Self> {
        let provisional = Arc::new(Self::provisional());
        let composite = Arc::new(Self {
            conditionals: ConditionalVisitor,
            loops: Some(LoopVisitor::new(provisional)),
            placeholders: PlaceholderVisitor,
        });
        if let Some(loops) = &composite.loops {
            loops.bind(Arc::downgrade(&composite));
        }
        composite
    }

    pub fn supports_loops(&self) -> bool {
        self.loops.is_some()
    }
}

impl DocumentVisitor for CompositeVisitor {
    fn visit_conditional<N: RegionNode>(
        &self,
        nodes: &mut Vec<N>,
        block: &ConditionalBlock,
        scope: &dyn EvaluationContext,
        pass: &mut Pass<'_>,
    ) -> MergeResult<bool> {
        self.conditionals
            .visit_conditional(nodes, block, scope, pass)
    }

    fn visit_loop<N: RegionNode>(
        &self,
        nodes: &mut Vec<N>,
        block: &LoopBlock,
        scope: &dyn EvaluationContext,
        pass: &mut Pass<'_>,
    ) -> MergeResult<Option<usize>> {
        match &self.loops {
            Some(loops) => loops.visit_loop(nodes, block, scope, pass),
            None => Ok(None),
        }
    }

    fn visit_text(
        &self,
        runs: &[Run],
        scope: &dyn EvaluationContext,
        pass: &mut Pass<'_>,
    ) -> MergeResult<Option<Vec<Run>>> {
        self.placeholders.visit_text(runs, scope, pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GlobalContext;
    use crate::options::ProcessingOptions;
    use crate::value::DataModel;
    use crate::walker::Walker;
    use docmerge_types::Block;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_binds_the_loop_visitor() {
        let composite = CompositeVisitor::build();
        assert!(composite.supports_loops());
        assert!(!CompositeVisitor::provisional().supports_loops());
        assert!(composite.loops.as_ref().is_some_and(LoopVisitor::is_bound));
    }

    #[test]
    fn test_provisional_composite_leaves_loops_alone() {
        let data: DataModel = [("Items", vec![1i64, 2])].into_iter().collect();
        let scope = GlobalContext::new(&data);
        let options = ProcessingOptions::default();
        let mut pass = Pass::new(&options);
        let visitor = CompositeVisitor::provisional();

        let mut blocks = vec![
            Block::text("{{#foreach Items}}"),
            Block::text("{{.}}"),
            Block::text("{{/foreach}}"),
        ];
        let before = blocks.clone();
        Walker::new(&visitor)
            .walk(&mut blocks, &scope, &mut pass)
            .unwrap();
        assert_eq!(blocks, before);
    }
}
