/*
 * placeholder.rs
 * Copyright (c) 2025 Posit, PBC
 */

use super::DocumentVisitor;
use crate::context::EvaluationContext;
use crate::emphasis::{has_markup, split_emphasis};
use crate::error::{MergeError, MergeResult};
use crate::options::MissingVariablePolicy;
use crate::pass::{Pass, WarningKind};
use crate::placeholder::{Placeholder, find_placeholders};
use crate::runs::{Edit, RunMap, apply_edits, flatten};
use crate::value::Value;
use docmerge_types::{Run, RunFormat};

/// Substitutes `{{...}}` placeholders in a window of runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderVisitor;

impl PlaceholderVisitor {
    fn replacement_runs(
        value: &Value,
        placeholder: &Placeholder,
        base: &RunFormat,
        pass: &Pass<'_>,
    ) -> Vec<Run> {
        let text = pass
            .options
            .value_formatter()
            .format(value, placeholder.spec.as_deref());

        let markup = pass.options.emphasis_markup
            && matches!(value, Value::String(_))
            && has_markup(&text);
        if !markup {
            return Edit::text(placeholder.span.clone(), text, base.clone()).runs;
        }
        split_emphasis(&text)
            .into_iter()
            .map(|segment| {
                let format = base.with_emphasis(segment.bold, segment.italic, segment.strike);
                Run::new(segment.text, format)
            })
            .collect()
    }
}

impl DocumentVisitor for PlaceholderVisitor {
    fn visit_text(
        &self,
        runs: &[Run],
        scope: &dyn EvaluationContext,
        pass: &mut Pass<'_>,
    ) -> MergeResult<Option<Vec<Run>>> {
        let text = flatten(runs);
        let placeholders = find_placeholders(&text)?;
        if placeholders.is_empty() {
            return Ok(None);
        }

        let map = RunMap::new(runs);
        let mut edits = Vec::with_capacity(placeholders.len());
        for placeholder in &placeholders {
            let base = &runs[map.run_at(placeholder.span.start)].format;
            match placeholder.resolve(scope) {
                Some(value) => {
                    tracing::trace!(
                        name = %placeholder.name,
                        spec = placeholder.spec.as_deref(),
                        value_type = value.type_name(),
                        "Substituting placeholder"
                    );
                    let runs = Self::replacement_runs(&value, placeholder, base, pass);
                    edits.push(Edit {
                        span: placeholder.span.clone(),
                        runs,
                    });
                    pass.count_replacement();
                }
                None => match pass.options.missing_variables {
                    MissingVariablePolicy::LeaveUnchanged => {
                        pass.warn(WarningKind::MissingVariable, &placeholder.name);
                    }
                    MissingVariablePolicy::ReplaceEmpty => {
                        pass.warn(WarningKind::MissingVariable, &placeholder.name);
                        edits.push(Edit::text(placeholder.span.clone(), "", base.clone()));
                    }
                    MissingVariablePolicy::Fail => {
                        return Err(MergeError::MissingVariable {
                            name: placeholder.name.clone(),
                        });
                    }
                },
            }
        }

        if edits.is_empty() {
            return Ok(None);
        }
        Ok(Some(apply_edits(runs, &edits)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::GlobalContext;
    use crate::options::ProcessingOptions;
    use crate::value::DataModel;
    use pretty_assertions::assert_eq;

    fn data() -> DataModel {
        DataModel::from_json(serde_json::json!({
            "Name": "Ann",
            "Total": 1234.5,
            "Paid": true,
            "Note": "**urgent** and *soon*",
        }))
        .unwrap()
    }

    fn visit(runs: &[Run], options: &ProcessingOptions) -> (MergeResult<Option<Vec<Run>>>, usize) {
        let data = data();
        let mut pass = Pass::new(options);
        let result = PlaceholderVisitor.visit_text(runs, &GlobalContext::new(&data), &mut pass);
        (result, pass.replacement_count)
    }

    #[test]
    fn test_substitution_keeps_surrounding_formatting() {
        let runs = vec![
            Run::new("Dear ", RunFormat::italic()),
            Run::new("{{Na", RunFormat::bold()),
            Run::plain("me}}, total {{Total:N2}}."),
        ];
        let (result, count) = visit(&runs, &ProcessingOptions::default());
        assert_eq!(
            result.unwrap().unwrap(),
            vec![
                Run::new("Dear ", RunFormat::italic()),
                Run::new("Ann", RunFormat::bold()),
                Run::plain(", total 1,234.50."),
            ]
        );
        assert_eq!(count, 2);
    }

    #[test]
    fn test_no_placeholders_is_unchanged() {
        let (result, count) = visit(&[Run::plain("plain text")], &ProcessingOptions::default());
        assert_eq!(result.unwrap(), None);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_emphasis_markup_is_merged_into_the_base_format() {
        let runs = vec![Run::new("{{Note}}", RunFormat::italic())];
        let (result, _) = visit(&runs, &ProcessingOptions::default());
        let both = RunFormat {
            bold: true,
            italic: true,
            ..RunFormat::default()
        };
        assert_eq!(
            result.unwrap().unwrap(),
            vec![
                Run::new("urgent", both),
                Run::new(" and soon", RunFormat::italic()),
            ]
        );

        let options = ProcessingOptions::default().with_emphasis_markup(false);
        let (result, _) = visit(&runs, &options);
        assert_eq!(
            result.unwrap().unwrap(),
            vec![Run::new("**urgent** and *soon*", RunFormat::italic())]
        );
    }

    #[test]
    fn test_missing_variable_policies() {
        let runs = vec![Run::plain("[{{Nope}}] {{Name}}")];

        let (result, count) = visit(&runs, &ProcessingOptions::default());
        assert_eq!(result.unwrap().unwrap(), vec![Run::plain("[{{Nope}}] Ann")]);
        assert_eq!(count, 1);

        let options =
            ProcessingOptions::default().with_missing_variables(MissingVariablePolicy::ReplaceEmpty);
        let (result, _) = visit(&runs, &options);
        assert_eq!(result.unwrap().unwrap(), vec![Run::plain("[] Ann")]);

        let options = ProcessingOptions::default().with_missing_variables(MissingVariablePolicy::Fail);
        let (result, _) = visit(&runs, &options);
        assert!(matches!(
            result,
            Err(MergeError::MissingVariable { name }) if name == "Nope"
        ));
    }

    #[test]
    fn test_boolean_formatter_and_expression() {
        let runs = vec![Run::plain("{{Paid:checkbox}} {{(Total > 1000)}}")];
        let (result, _) = visit(&runs, &ProcessingOptions::default());
        assert_eq!(result.unwrap().unwrap(), vec![Run::plain("\u{2611} true")]);
    }
}
