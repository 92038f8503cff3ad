/*
 * conditional.rs
 * Copyright (c) 2025 Posit, PBC
 */

use super::DocumentVisitor;
use crate::context::EvaluationContext;
use crate::detect::ConditionalBlock;
use crate::error::MergeResult;
use crate::expression::Predicate;
use crate::pass::Pass;
use crate::walker::RegionNode;

/// Replaces a conditional block with the content of its first true branch.
///
/// A block with no true branch and no `{{else}}` is removed entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionalVisitor;

impl DocumentVisitor for ConditionalVisitor {
    fn visit_conditional<N: RegionNode>(
        &self,
        nodes: &mut Vec<N>,
        block: &ConditionalBlock,
        scope: &dyn EvaluationContext,
        _pass: &mut Pass<'_>,
    ) -> MergeResult<bool> {
        // Parse every predicate up front so a malformed branch is reported
        // whichever branch wins.
        let predicates = block
            .branches
            .iter()
            .map(|branch| branch.predicate.as_deref().map(Predicate::parse).transpose())
            .collect::<MergeResult<Vec<_>>>()?;

        let chosen = block
            .branches
            .iter()
            .zip(&predicates)
            .position(|(_, predicate)| {
                predicate
                    .as_ref()
                    .is_none_or(|predicate| predicate.evaluate(scope))
            });

        let content: Vec<N> = match chosen {
            Some(index) => nodes[block.branches[index].content.clone()].to_vec(),
            None => Vec::new(),
        };
        tracing::debug!(
            region = N::LEVEL.name(),
            branch = ?chosen,
            branches = block.branches.len(),
            kept = content.len(),
            "Conditional resolved"
        );
        nodes.splice(block.span.clone(), content);
        Ok(true)
    }
}
