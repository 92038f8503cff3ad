/*
 * loops.rs
 * Copyright (c) 2025 Posit, PBC
 */

use super::{CompositeVisitor, DocumentVisitor};
use crate::context::{EvaluationContext, LoopContext};
use crate::detect::LoopBlock;
use crate::error::MergeResult;
use crate::pass::{Pass, WarningKind};
use crate::value::Value;
use crate::walker::{RegionNode, Walker};
use std::sync::{Arc, OnceLock, Weak};

/// Expands `{{#foreach}}` blocks.
///
/// Every iteration clones the loop body, processes the clone with the full
/// pipeline under a [`LoopContext`] for the item, and the processed copies
/// replace the block.
///
/// - A list iterates over its items; any other non-null value iterates once
///   with the value itself as the item.
/// - An empty list renders the `{{#empty}}` branch if there is one.
/// - A missing or null collection is a warning and removes the block.
pub struct LoopVisitor {
    pipeline: OnceLock<Weak<CompositeVisitor>>,
    fallback: Arc<CompositeVisitor>,
}

impl LoopVisitor {
    /// Create a loop visitor that runs `fallback` until it is bound.
    pub fn new(fallback: Arc<CompositeVisitor>) -> Self {
        Self {
            pipeline: OnceLock::new(),
            fallback,
        }
    }

    /// Bind the pipeline used for loop bodies. Only the first call has an
    /// effect.
    pub fn bind(&self, pipeline: Weak<CompositeVisitor>) {
        if self.pipeline.set(pipeline).is_err() {
            tracing::debug!("loop visitor is already bound");
        }
    }

    pub fn is_bound(&self) -> bool {
        self.pipeline.get().is_some_and(|weak| weak.strong_count() > 0)
    }

    fn pipeline(&self) -> Arc<CompositeVisitor> {
        self.pipeline
            .get()
            .and_then(Weak::upgrade)
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    fn remove<N>(nodes: &mut Vec<N>, block: &LoopBlock) -> Option<usize> {
        nodes.drain(block.span.clone());
        Some(0)
    }
}

impl DocumentVisitor for LoopVisitor {
    fn visit_loop<N: RegionNode>(
        &self,
        nodes: &mut Vec<N>,
        block: &LoopBlock,
        scope: &dyn EvaluationContext,
        pass: &mut Pass<'_>,
    ) -> MergeResult<Option<usize>> {
        let pipeline = self.pipeline();
        let walker = Walker::new(pipeline.as_ref());

        let Some(collection) = scope.resolve(&block.collection) else {
            pass.warn(WarningKind::MissingCollection, &block.collection);
            return Ok(Self::remove(nodes, block));
        };

        let items: &[Value] = match collection.as_ref() {
            Value::Null => {
                pass.warn(WarningKind::NullCollection, &block.collection);
                return Ok(Self::remove(nodes, block));
            }
            Value::List(items) => items,
            single => std::slice::from_ref(single),
        };

        if items.is_empty() {
            tracing::debug!(
                collection = %block.collection,
                has_empty_branch = block.empty.is_some(),
                "Loop collection is empty"
            );
            let Some(empty) = &block.empty else {
                return Ok(Self::remove(nodes, block));
            };
            let mut content = nodes[empty.clone()].to_vec();
            walker.walk(&mut content, scope, pass)?;
            let inserted = content.len();
            nodes.splice(block.span.clone(), content);
            return Ok(Some(inserted));
        }

        tracing::debug!(
            collection = %block.collection,
            alias = block.alias.as_deref(),
            items = items.len(),
            row_level = block.is_row_level(),
            "Expanding loop"
        );

        let body: Vec<N> = nodes[block.content.clone()].to_vec();
        let mut output = Vec::with_capacity(body.len() * items.len());
        for (index, item) in items.iter().enumerate() {
            let context = LoopContext::new(item, index, items.len(), &block.collection, scope)
                .with_alias(block.alias.as_deref());
            let mut copy = body.clone();
            walker.walk(&mut copy, &context, pass)?;
            output.append(&mut copy);
        }

        let inserted = output.len();
        nodes.splice(block.span.clone(), output);
        Ok(Some(inserted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GlobalContext;
    use crate::options::ProcessingOptions;
    use crate::value::DataModel;
    use docmerge_types::Block;
    use pretty_assertions::assert_eq;

    fn run(blocks: &mut Vec<Block>, data: &DataModel) -> Vec<crate::pass::ProcessingWarning> {
        let composite = CompositeVisitor::build();
        let options = ProcessingOptions::default();
        let mut pass = Pass::new(&options);
        Walker::new(composite.as_ref())
            .walk(blocks, &GlobalContext::new(data), &mut pass)
            .unwrap();
        pass.warnings.into_warnings()
    }

    fn texts(blocks: &[Block]) -> Vec<String> {
        blocks.iter().map(Block::plain_text).collect()
    }

    #[test]
    fn test_block_level_loop() {
        let data = DataModel::from_json(serde_json::json!({ "Items": ["a", "b", "c"] })).unwrap();
        let mut blocks = vec![
            Block::text("Before"),
            Block::text("{{#foreach Items}}"),
            Block::text("{{@index}}:{{.}}"),
            Block::text("{{/foreach}}"),
            Block::text("After"),
        ];
        assert!(run(&mut blocks, &data).is_empty());
        assert_eq!(texts(&blocks), vec!["Before", "0:a", "1:b", "2:c", "After"]);
    }

    #[test]
    fn test_scalar_value_iterates_once() {
        let data = DataModel::from_json(serde_json::json!({ "Customer": { "Name": "Ann" } }))
            .unwrap();
        let mut blocks = vec![Block::text("{{#foreach Customer}}[{{Name}}/{{@count}}]{{/foreach}}")];
        run(&mut blocks, &data);
        assert_eq!(texts(&blocks), vec!["[Ann/1]"]);
    }

    #[test]
    fn test_missing_and_null_collections_warn_and_remove() {
        let data = DataModel::from_json(serde_json::json!({ "Nothing": null })).unwrap();
        let mut blocks = vec![
            Block::text("a{{#foreach Missing}}x{{/foreach}}b"),
            Block::text("{{#foreach Nothing}}"),
            Block::text("y"),
            Block::text("{{/foreach}}"),
        ];
        let warnings = run(&mut blocks, &data);
        assert_eq!(texts(&blocks), vec!["ab"]);
        let kinds: Vec<_> = warnings.iter().map(|w| (w.kind, w.name.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (WarningKind::NullCollection, "Nothing"),
                (WarningKind::MissingCollection, "Missing"),
            ]
        );
    }

    #[test]
    fn test_empty_branch() {
        let data = DataModel::from_json(serde_json::json!({ "Items": [], "Label": "none" }))
            .unwrap();
        let mut blocks =
            vec![Block::text("{{#foreach Items}}{{.}}{{#empty}}({{Label}}){{/foreach}}")];
        run(&mut blocks, &data);
        assert_eq!(texts(&blocks), vec!["(none)"]);

        let mut blocks = vec![Block::text("<{{#foreach Items}}{{.}}{{/foreach}}>")];
        run(&mut blocks, &data);
        assert_eq!(texts(&blocks), vec!["<>"]);
    }
}
