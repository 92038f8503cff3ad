/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Evaluation contexts.
//!
//! Names are resolved through a chain of contexts: a [`LoopContext`] per
//! active loop iteration, ending in the [`GlobalContext`] that wraps the data
//! model. Inner loop bodies reach outer items and global data through the
//! parent chain with no explicit plumbing.
//!
//! Contexts are immutable. A new [`LoopContext`] is built for every
//! iteration and borrows its parent, so the chain is always a tree.

use crate::path::{PropertyPath, is_compound};
use crate::value::{DataModel, Value};
use std::borrow::Cow;

/// Loop metadata names available inside a loop body.
pub const INDEX: &str = "@index";
pub const FIRST: &str = "@first";
pub const LAST: &str = "@last";
pub const COUNT: &str = "@count";

/// A scoped name-resolution capability.
pub trait EvaluationContext {
    /// Resolve a name or property path.
    ///
    /// Returns `None` when nothing in the chain knows the name. A name that
    /// resolves to an explicit null yields `Some(Value::Null)`.
    fn resolve(&self, name: &str) -> Option<Cow<'_, Value>>;

    /// Nesting depth: 0 for the global context.
    fn depth(&self) -> usize;
}

/// Context wrapping the root data model.
#[derive(Debug, Clone, Copy)]
pub struct GlobalContext<'d> {
    data: &'d DataModel,
}

impl<'d> GlobalContext<'d> {
    pub fn new(data: &'d DataModel) -> Self {
        Self { data }
    }
}

impl EvaluationContext for GlobalContext<'_> {
    fn resolve(&self, name: &str) -> Option<Cow<'_, Value>> {
        let name = name.trim();
        if let Some(value) = self.data.get(name) {
            return Some(Cow::Borrowed(value));
        }
        if !is_compound(name) {
            return None;
        }
        let path = parse_quietly(name)?;
        let root = self.data.get(path.root_name()?)?;
        path.resolve_tail(root).map(Cow::Borrowed)
    }

    fn depth(&self) -> usize {
        0
    }
}

/// Context for one iteration of a loop.
pub struct LoopContext<'a> {
    item: &'a Value,
    index: usize,
    count: usize,
    collection: &'a str,
    alias: Option<&'a str>,
    parent: &'a dyn EvaluationContext,
}

impl<'a> LoopContext<'a> {
    pub fn new(
        item: &'a Value,
        index: usize,
        count: usize,
        collection: &'a str,
        parent: &'a dyn EvaluationContext,
    ) -> Self {
        Self {
            item,
            index,
            count,
            collection,
            alias: None,
            parent,
        }
    }

    /// Also bind the item under `alias` (`{{#foreach line in Lines}}`).
    pub fn with_alias(mut self, alias: Option<&'a str>) -> Self {
        self.alias = alias;
        self
    }

    pub fn item(&self) -> &Value {
        self.item
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn collection(&self) -> &str {
        self.collection
    }

    fn metadata(&self, name: &str) -> Option<Value> {
        let value = match name {
            INDEX => Value::Integer(self.index as i64),
            FIRST => Value::Bool(self.index == 0),
            LAST => Value::Bool(self.index + 1 == self.count),
            COUNT => Value::Integer(self.count as i64),
            _ => return None,
        };
        Some(value)
    }

    /// Resolve `name` against the current item only.
    fn resolve_item(&self, name: &str) -> Option<&'a Value> {
        if name == "." || name == "this" {
            return Some(self.item);
        }
        if self.alias == Some(name) {
            return Some(self.item);
        }
        if let Some(value) = self.item.field(name) {
            return Some(value);
        }
        if !is_compound(name) {
            return None;
        }

        let path = parse_quietly(name)?;
        let root = path.root_name()?;
        if root == "this" || self.alias == Some(root) {
            return path.resolve_tail(self.item);
        }
        // `.Name` style paths are rejected by the parser; only item fields
        // can anchor a path here.
        path.resolve_tail(self.item.field(root)?)
    }
}

impl EvaluationContext for LoopContext<'_> {
    fn resolve(&self, name: &str) -> Option<Cow<'_, Value>> {
        let name = name.trim();
        if let Some(value) = self.metadata(name) {
            return Some(Cow::Owned(value));
        }
        if let Some(value) = self.resolve_item(name) {
            return Some(Cow::Borrowed(value));
        }
        self.parent.resolve(name)
    }

    fn depth(&self) -> usize {
        self.parent.depth() + 1
    }
}

fn parse_quietly(name: &str) -> Option<PropertyPath> {
    match PropertyPath::parse(name) {
        Ok(path) => Some(path),
        Err(err) => {
            tracing::trace!(name, error = %err, "name is not a valid property path");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn data() -> DataModel {
        DataModel::from_json(serde_json::json!({
            "Company": "Acme",
            "Customer": { "Address": { "City": "Berlin" } },
            "Orders": [
                { "Id": 1, "Lines": [{ "Sku": "A-1" }, { "Sku": "A-2" }] },
                { "Id": 2, "Lines": [] },
            ],
            "dotted.key": "direct",
        }))
        .unwrap()
    }

    fn resolved(ctx: &dyn EvaluationContext, name: &str) -> Option<Value> {
        ctx.resolve(name).map(Cow::into_owned)
    }

    #[test]
    fn test_global_direct_and_paths() {
        let data = data();
        let global = GlobalContext::new(&data);

        assert_eq!(resolved(&global, "Company"), Some(Value::from("Acme")));
        assert_eq!(
            resolved(&global, "Customer.Address.City"),
            Some(Value::from("Berlin"))
        );
        assert_eq!(
            resolved(&global, "Orders[0].Lines[1].Sku"),
            Some(Value::from("A-2"))
        );
        // Direct lookup wins over path navigation.
        assert_eq!(resolved(&global, "dotted.key"), Some(Value::from("direct")));
        assert_eq!(resolved(&global, "Missing"), None);
        assert_eq!(resolved(&global, "Orders[9].Id"), None);
        assert_eq!(resolved(&global, "a..b"), None);
    }

    #[test]
    fn test_loop_metadata() {
        let data = data();
        let global = GlobalContext::new(&data);
        let item = Value::from("x");

        let first = LoopContext::new(&item, 0, 3, "Items", &global);
        assert_eq!(resolved(&first, "@index"), Some(Value::Integer(0)));
        assert_eq!(resolved(&first, "@first"), Some(Value::Bool(true)));
        assert_eq!(resolved(&first, "@last"), Some(Value::Bool(false)));
        assert_eq!(resolved(&first, "@count"), Some(Value::Integer(3)));

        let last = LoopContext::new(&item, 2, 3, "Items", &global);
        assert_eq!(resolved(&last, "@first"), Some(Value::Bool(false)));
        assert_eq!(resolved(&last, "@last"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_scalar_item_only_resolves_this() {
        let data = data();
        let global = GlobalContext::new(&data);
        let item = Value::from("x");
        let ctx = LoopContext::new(&item, 0, 1, "Items", &global);

        assert_eq!(resolved(&ctx, "."), Some(Value::from("x")));
        assert_eq!(resolved(&ctx, "this"), Some(Value::from("x")));
        assert_eq!(resolved(&ctx, "Name"), None);
        // Falls through to the parent.
        assert_eq!(resolved(&ctx, "Company"), Some(Value::from("Acme")));
    }

    #[test]
    fn test_nested_loops_reach_outer_scopes() {
        let data = data();
        let global = GlobalContext::new(&data);
        let orders = global.resolve("Orders").unwrap();
        let order = orders.element(0).unwrap();
        let outer = LoopContext::new(order, 0, 2, "Orders", &global);

        let lines = outer.resolve("Lines").unwrap();
        let line = lines.element(1).unwrap();
        let inner = LoopContext::new(line, 1, 2, "Lines", &outer).with_alias(Some("line"));

        assert_eq!(resolved(&inner, "Sku"), Some(Value::from("A-2")));
        assert_eq!(resolved(&inner, "line.Sku"), Some(Value::from("A-2")));
        assert_eq!(resolved(&inner, "this.Sku"), Some(Value::from("A-2")));
        assert_eq!(resolved(&inner, "Id"), Some(Value::Integer(1)));
        assert_eq!(resolved(&inner, "Company"), Some(Value::from("Acme")));
        assert_eq!(resolved(&inner, "@index"), Some(Value::Integer(1)));
        assert_eq!(inner.depth(), 2);
    }
}
