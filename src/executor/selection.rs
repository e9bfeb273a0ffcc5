//! Walks one selection of a selection set and queues field resolutions.

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{
    ast::{AstNode, NodeKind},
    error::{ExecutionResult, FieldResult, SchemaError},
    value::{MapValue, Value},
};

use super::{FragmentMap, RequestState, Resolver, ResolverMap, ResolverParams, TypeNames, ValueVisitor};

/// Visits one top-level selection and everything a fragment spreads into
/// it, dispatching each selected field to its resolver unless a directive
/// or type condition skips it.
///
/// The queued `(alias, future)` pairs keep selection order; awaiting them
/// in that order is what makes response key order observable.
pub(crate) struct SelectionVisitor<'a> {
    state: Option<Arc<RequestState>>,
    fragments: &'a Arc<FragmentMap>,
    variables: &'a Arc<MapValue>,
    type_names: &'a TypeNames,
    resolvers: &'a ResolverMap,
    values: Vec<(String, BoxFuture<'static, ExecutionResult>)>,
}

impl<'a> SelectionVisitor<'a> {
    pub(crate) fn new(
        state: Option<Arc<RequestState>>,
        fragments: &'a Arc<FragmentMap>,
        variables: &'a Arc<MapValue>,
        type_names: &'a TypeNames,
        resolvers: &'a ResolverMap,
    ) -> Self {
        Self {
            state,
            fragments,
            variables,
            type_names,
            resolvers,
            values: Vec::new(),
        }
    }

    /// Releases the queued field evaluations, in selection order.
    pub(crate) fn into_values(self) -> Vec<(String, BoxFuture<'static, ExecutionResult>)> {
        self.values
    }

    pub(crate) fn visit(&mut self, selection: &Arc<AstNode>) -> FieldResult<()> {
        match selection.kind() {
            NodeKind::Field => self.visit_field(selection),
            NodeKind::FragmentSpread => self.visit_fragment_spread(selection),
            NodeKind::InlineFragment => self.visit_inline_fragment(selection),
            _ => Ok(()),
        }
    }

    fn visit_field(&mut self, field: &Arc<AstNode>) -> FieldResult<()> {
        let name = field
            .find_child(NodeKind::FieldName)
            .map(|child| child.content().to_owned())
            .unwrap_or_default();

        let mut alias = field
            .find_child(NodeKind::AliasName)
            .map(|child| child.content().to_owned())
            .unwrap_or_default();

        if alias.is_empty() {
            alias = name.clone();
        }

        let Some(resolver) = self.resolvers.get(&name) else {
            let position = field.position();

            return Err(SchemaError::new(format!(
                "Unknown field name: {name} line: {} column: {}",
                position.line(),
                position.column(),
            )));
        };

        let directives = self.collect_directives(field)?;

        if should_skip(&directives)? {
            return Ok(());
        }

        let arguments = match field.find_child(NodeKind::Arguments) {
            Some(node) => self.collect_arguments(node)?,
            None => MapValue::new(),
        };

        let selection = field.find_child(NodeKind::SelectionSet).cloned();

        self.values.push((
            alias,
            self.dispatch(resolver, arguments, directives, selection),
        ));

        Ok(())
    }

    fn dispatch(
        &self,
        resolver: &Resolver,
        arguments: MapValue,
        directives: MapValue,
        selection: Option<Arc<AstNode>>,
    ) -> BoxFuture<'static, ExecutionResult> {
        resolver(ResolverParams {
            state: self.state.clone(),
            arguments,
            directives,
            selection,
            fragments: Arc::clone(self.fragments),
            variables: Arc::clone(self.variables),
        })
    }

    fn visit_fragment_spread(&mut self, spread: &Arc<AstNode>) -> FieldResult<()> {
        let name = spread
            .find_child(NodeKind::FragmentName)
            .map(|child| child.content())
            .unwrap_or_default();

        let Some(fragment) = self.fragments.get(name) else {
            let position = spread.position();

            return Err(SchemaError::new(format!(
                "Unknown fragment name: {name} line: {} column: {}",
                position.line(),
                position.column(),
            )));
        };

        let mut skip = !self.type_names.contains(fragment.type_condition());

        if !skip {
            let directives = self.collect_directives(spread)?;

            skip = should_skip(&directives)?;
        }

        if skip {
            return Ok(());
        }

        let selection_set = Arc::clone(fragment.selection_set());

        for selection in selection_set.children() {
            self.visit(selection)?;
        }

        Ok(())
    }

    fn visit_inline_fragment(&mut self, fragment: &Arc<AstNode>) -> FieldResult<()> {
        let directives = self.collect_directives(fragment)?;

        if should_skip(&directives)? {
            return Ok(());
        }

        if let Some(condition) = fragment.find_child(NodeKind::TypeCondition) {
            let matches = condition
                .children()
                .first()
                .is_some_and(|name| self.type_names.contains(name.content()));

            if !matches {
                return Ok(());
            }
        }

        if let Some(selection_set) = fragment.find_child(NodeKind::SelectionSet) {
            let selection_set = Arc::clone(selection_set);

            for selection in selection_set.children() {
                self.visit(selection)?;
            }
        }

        Ok(())
    }

    /// Collects the directives of a selection into a map of directive name
    /// to argument map. Unknown directive names are collected as well and
    /// handed to the resolver untouched.
    fn collect_directives(&self, selection: &AstNode) -> FieldResult<MapValue> {
        let mut result = MapValue::new();

        let Some(directives) = selection.find_child(NodeKind::Directives) else {
            return Ok(result);
        };

        for directive in directives.children() {
            let name = directive
                .find_child(NodeKind::DirectiveName)
                .map(|child| child.content())
                .unwrap_or_default();

            if name.is_empty() {
                continue;
            }

            let arguments = match directive.find_child(NodeKind::Arguments) {
                Some(node) => self.collect_arguments(node)?,
                None => MapValue::new(),
            };

            result.add_field(name, Value::Map(arguments));
        }

        Ok(result)
    }

    /// Evaluates the name and value of every argument under an `arguments`
    /// node, substituting variables.
    fn collect_arguments(&self, arguments: &AstNode) -> FieldResult<MapValue> {
        let visitor = ValueVisitor::new(self.variables);
        let mut result = MapValue::with_capacity(arguments.children().len());

        for argument in arguments.children() {
            let (Some(name), Some(value)) =
                (argument.children().first(), argument.children().last())
            else {
                continue;
            };

            result.add_field(name.content(), visitor.visit(value)?);
        }

        Ok(result)
    }

}

/// Evaluates `@skip` and `@include`, in that fixed priority order.
///
/// Both take exactly one Boolean argument named `if`; anything else is an
/// error. The first of the two directives that is present decides alone:
/// `@include` is only consulted when `@skip` is absent.
fn should_skip(directives: &MapValue) -> FieldResult<bool> {
    const SKIPPED_NAMES: [(bool, &str); 2] = [(true, "skip"), (false, "include")];

    for (skip, name) in SKIPPED_NAMES {
        let Some(arguments) = directives.get_field_value(name) else {
            continue;
        };

        let Some(arguments) = arguments.as_map() else {
            return Err(SchemaError::new(format!(
                "Invalid arguments to directive: {name}",
            )));
        };

        let mut argument_true = false;
        let mut argument_false = false;

        for (key, value) in arguments.iter() {
            let condition = value.as_bool();

            if argument_true || argument_false || condition.is_none() || key != "if" {
                return Err(SchemaError::new(format!(
                    "Invalid argument to directive: {name} name: {key}",
                )));
            }

            argument_true = condition == Some(true);
            argument_false = !argument_true;
        }

        if argument_true {
            return Ok(skip);
        } else if argument_false {
            return Ok(!skip);
        }

        return Err(SchemaError::new(format!(
            "Missing argument to directive: {name} name: if",
        )));
    }

    Ok(false)
}
