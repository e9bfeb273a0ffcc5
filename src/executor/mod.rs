//! Resolve selection sets against resolver-backed objects.

mod input;
mod selection;

use std::{any::Any, sync::Arc};

use fnv::{FnvHashMap, FnvHashSet};
use futures::{FutureExt as _, future::BoxFuture};
use static_assertions::assert_obj_safe;

use crate::{
    ast::{AstNode, NodeKind},
    error::ExecutionResult,
    types::ResolveValue,
    value::{MapValue, Value},
};

pub(crate) use self::{input::ValueVisitor, selection::SelectionVisitor};

/// Opaque per-request state handed to every resolver.
///
/// The engine passes it through untouched; downcast it to your own type
/// inside resolvers and hooks. Any synchronization of interior mutation is
/// the caller's responsibility.
pub type RequestState = dyn Any + Send + Sync;

/// A named fragment: a type condition plus the selection set it spreads.
///
/// Fragments share the request document through [`Arc`], so they stay valid
/// for as long as a subscription keeps its query alive.
#[derive(Clone, Debug)]
pub struct Fragment {
    type_condition: String,
    selection_set: Arc<AstNode>,
}

impl Fragment {
    /// Builds a [`Fragment`] from a `fragment_definition` node.
    #[must_use]
    pub fn new(definition: &AstNode) -> Self {
        let type_condition = definition
            .find_child(NodeKind::TypeCondition)
            .and_then(|condition| condition.children().first())
            .map(|name| name.content().into())
            .unwrap_or_default();
        let selection_set = definition
            .find_child(NodeKind::SelectionSet)
            .map_or_else(
                || AstNode::new(NodeKind::SelectionSet, "").shared(),
                Arc::clone,
            );

        Self {
            type_condition,
            selection_set,
        }
    }

    /// The name of the type this fragment applies to.
    #[must_use]
    pub fn type_condition(&self) -> &str {
        &self.type_condition
    }

    /// The selection set spread wherever this fragment is referenced.
    #[must_use]
    pub fn selection_set(&self) -> &Arc<AstNode> {
        &self.selection_set
    }
}

/// Fragment definitions of a request document, keyed by fragment name.
///
/// Resolvers for complex types need to find fragment definitions anywhere
/// in the request document by name.
pub type FragmentMap = FnvHashMap<String, Fragment>;

/// Collects every top-level `fragment_definition` of `root` into a
/// [`FragmentMap`].
#[must_use]
pub fn collect_fragments(root: &AstNode) -> FragmentMap {
    root.filter_children(NodeKind::FragmentDefinition)
        .filter_map(|definition| {
            let name = definition.find_child(NodeKind::FragmentName)?;
            Some((name.content().into(), Fragment::new(definition)))
        })
        .collect()
}

/// The inputs a resolver sees for a single field.
#[derive(Clone)]
pub struct ResolverParams {
    /// Opaque caller state for this request.
    pub state: Option<Arc<RequestState>>,

    /// Coerced arguments of the field, variables already substituted.
    pub arguments: MapValue,

    /// Directives on the field, as a map of directive name to argument map.
    pub directives: MapValue,

    /// The field's sub-selection, for fields of complex type.
    pub selection: Option<Arc<AstNode>>,

    /// Fragment definitions of the request document.
    pub fragments: Arc<FragmentMap>,

    /// Coerced variables of the operation.
    pub variables: Arc<MapValue>,
}

/// Resolver callback producing the value of a single field.
///
/// Invoked once per selected field, in selection order; the returned future
/// is awaited later, also in selection order. Rust futures are lazy, so a
/// resolver that just wraps a value in `async move` does no work until the
/// response map is assembled.
pub type Resolver = Box<dyn Fn(ResolverParams) -> BoxFuture<'static, ExecutionResult> + Send + Sync>;

/// Field resolvers of an object type, keyed by the GraphQL field name
/// exactly as it appears on the type.
pub type ResolverMap = FnvHashMap<String, Resolver>;

/// The names a type answers to: its own name plus every interface and union
/// it satisfies. Fragments with a type condition outside this set are
/// skipped.
pub type TypeNames = FnvHashSet<String>;

/// A polymorphic node of the object graph.
///
/// An object type owns the set of names it answers to and a resolver per
/// field. [`ObjectType::resolve`] parses argument values, performs variable
/// lookups, expands fragments, evaluates `@include` and `@skip` directives
/// and calls through to the resolver for each selected field. This may be a
/// recursive process for fields which return another complex type, in which
/// case the resolver receives its own selection set.
///
/// Schema layers implement this trait on their generated types; the engine
/// only ever sees `Arc<dyn ObjectType>`. [`Object`] is the ready-made
/// implementation for objects assembled from closures.
pub trait ObjectType: Send + Sync {
    /// The names this type answers to.
    fn type_names(&self) -> &TypeNames;

    /// The field resolvers of this type.
    fn resolvers(&self) -> &ResolverMap;

    /// Called before the fields of one selection set are dispatched.
    fn begin_selection_set(&self, _state: &Option<Arc<RequestState>>) {}

    /// Called after the fields of one selection set were dispatched, before
    /// any of their values is awaited.
    fn end_selection_set(&self, _state: &Option<Arc<RequestState>>) {}

    /// Resolves `selection_set` against this object.
    ///
    /// Walks the selections in order, dispatching each field to its
    /// resolver, then awaits the collected values in the same order and
    /// merges them into a single map. The result is always a map; `null`
    /// for a missing object is produced one layer up, by the nullable
    /// result conversion.
    fn resolve(
        &self,
        state: Option<Arc<RequestState>>,
        selection_set: Arc<AstNode>,
        fragments: Arc<FragmentMap>,
        variables: Arc<MapValue>,
    ) -> BoxFuture<'_, ExecutionResult> {
        async move {
            self.begin_selection_set(&state);

            let mut selections = Vec::with_capacity(selection_set.children().len());

            for selection in selection_set.children() {
                let mut visitor = SelectionVisitor::new(
                    state.clone(),
                    &fragments,
                    &variables,
                    self.type_names(),
                    self.resolvers(),
                );

                visitor.visit(selection)?;
                selections.push(visitor.into_values());
            }

            self.end_selection_set(&state);

            let mut result = MapValue::new();

            for values in selections {
                for (alias, pending) in values {
                    result.add_field(alias, pending.await?);
                }
            }

            Ok(Value::Map(result))
        }
        .boxed()
    }
}

assert_obj_safe!(ObjectType);

/// An [`ObjectType`] assembled from a type-name set and a resolver map.
pub struct Object {
    type_names: TypeNames,
    resolvers: ResolverMap,
}

impl Object {
    /// Constructs a new [`Object`] answering to `type_names` and resolving
    /// fields through `resolvers`.
    #[must_use]
    pub fn new(type_names: TypeNames, resolvers: ResolverMap) -> Self {
        Self {
            type_names,
            resolvers,
        }
    }
}

impl ObjectType for Object {
    fn type_names(&self) -> &TypeNames {
        &self.type_names
    }

    fn resolvers(&self) -> &ResolverMap {
        &self.resolvers
    }
}

impl<T: ObjectType + ?Sized + 'static> ResolveValue for Arc<T> {
    /// Resolves the field's sub-selection against the shared object.
    ///
    /// A field of complex type selected without a sub-selection yields an
    /// empty map.
    fn resolve_value(self, params: ResolverParams) -> BoxFuture<'static, ExecutionResult> {
        let ResolverParams {
            state,
            selection,
            fragments,
            variables,
            ..
        } = params;

        match selection {
            Some(selection_set) => async move {
                self.resolve(state, selection_set, fragments, variables)
                    .await
            }
            .boxed(),
            None => futures::future::ready(Ok(Value::Map(MapValue::new()))).boxed(),
        }
    }
}
