//! Root of the object graph: operation dispatch, response wrapping and
//! subscription delivery.

pub mod subscriptions;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fnv::FnvHashSet;
use futures::FutureExt as _;
use indexmap::IndexMap;

use crate::{
    ast::{AstNode, NodeKind},
    error::{ExecutionResult, FieldResult, SchemaError},
    executor::{ObjectType, RequestState, ValueVisitor, collect_fragments},
    value::{MapValue, Value},
};

use self::subscriptions::{
    OperationData, Registry, SubscriptionCallback, SubscriptionData, SubscriptionKey,
    SubscriptionParams,
};

/// Root objects keyed by operation kind: `"query"`, `"mutation"` and
/// `"subscription"`.
pub type TypeMap = IndexMap<String, Arc<dyn ObjectType>>;

/// Root of an object graph, one root object per operation kind.
///
/// Scans the fragment definitions of a request document, finds the right
/// operation definition to interpret depending on the operation name (which
/// might be empty for a single-operation document), coerces the request
/// variables and hands the operation's selection set to the matching root
/// object. Also owns the table of live subscriptions.
pub struct RootNode {
    operations: TypeMap,
    subscriptions: Mutex<Registry>,
}

impl RootNode {
    /// Constructs a new [`RootNode`] over the provided root objects.
    #[must_use]
    pub fn new(operation_types: TypeMap) -> Self {
        Self {
            operations: operation_types,
            subscriptions: Mutex::new(Registry::new()),
        }
    }

    /// Resolves a query or mutation document against the matching root
    /// object.
    ///
    /// Subscription operations are ignored here; they are registered
    /// through [`RootNode::subscribe`] instead. The returned document is
    /// `{"data": <result>}`, or `{"data": null, "errors": [...]}` when a
    /// [`SchemaError`] was raised anywhere along the way — this method
    /// itself never fails.
    pub async fn resolve(
        &self,
        state: Option<Arc<RequestState>>,
        root: &Arc<AstNode>,
        operation_name: &str,
        variables: MapValue,
    ) -> Value {
        match self.execute(state, root, operation_name, variables).await {
            Ok(data) => document(data),
            Err(err) => error_document(err),
        }
    }

    async fn execute(
        &self,
        state: Option<Arc<RequestState>>,
        root: &Arc<AstNode>,
        operation_name: &str,
        variables: MapValue,
    ) -> ExecutionResult {
        let fragments = Arc::new(collect_fragments(root));
        let (operation, kind) = select_operation(root, operation_name, false)?;

        let root_object = self.operations.get(&kind).ok_or_else(|| {
            let name = operation
                .find_child(NodeKind::OperationName)
                .map(|child| child.content())
                .unwrap_or_default();
            let position = operation.position();
            let mut error = format!("Unknown operation type: {kind}");

            if !name.is_empty() {
                error.push_str(&format!(" name: {name}"));
            }

            error.push_str(&format!(
                " line: {} column: {}",
                position.line(),
                position.column(),
            ));

            SchemaError::new(error)
        })?;

        let variables = Arc::new(coerce_variables(operation, &variables)?);

        root_object
            .resolve(state, operation_selection_set(operation), fragments, variables)
            .await
    }

    /// Registers a long-lived subscription for the `subscription` operation
    /// of `params.query`.
    ///
    /// Collects the top-level field names of the subscribed selection set
    /// (fragments are not expanded here; field-name identity is the event
    /// key) and indexes the registration under each of them. Unlike
    /// [`RootNode::resolve`], validation failures propagate to the caller.
    ///
    /// The returned key is valid until [`RootNode::unsubscribe`]; keys of
    /// removed subscriptions may be reused.
    pub fn subscribe(
        &self,
        params: SubscriptionParams,
        callback: SubscriptionCallback,
    ) -> FieldResult<SubscriptionKey> {
        let fragments = collect_fragments(&params.query);
        let (operation, _) = select_operation(&params.query, &params.operation_name, true)?;

        let variables = coerce_variables(operation, &params.variables)?;
        let selection_set = operation_selection_set(operation);
        let field_names: FnvHashSet<String> = selection_set
            .filter_children(NodeKind::Field)
            .filter_map(|field| field.find_child(NodeKind::FieldName))
            .map(|name| name.content().into())
            .collect();

        let registration = Arc::new(SubscriptionData {
            data: OperationData {
                state: params.state,
                variables: Arc::new(variables),
                fragments: Arc::new(fragments),
            },
            field_names,
            query: Arc::clone(&params.query),
            operation_name: params.operation_name,
            callback,
            selection_set,
        });

        Ok(self.registry().register(registration))
    }

    /// Removes a subscription registration; unknown keys are a no-op.
    pub fn unsubscribe(&self, key: SubscriptionKey) {
        self.registry().remove(key);
    }

    /// Delivers an event on `field_name` to every matching subscription, in
    /// the order the subscriptions were registered.
    ///
    /// Each registration's callback is invoked synchronously on the
    /// delivering task with a lazy future of the wrapped response document;
    /// long work belongs inside the callback. When `subscription_object` is
    /// [`None`], the `"subscription"` root of the operation-type map
    /// resolves the event.
    pub fn deliver(&self, field_name: &str, subscription_object: Option<Arc<dyn ObjectType>>) {
        let subscription_root =
            subscription_object.or_else(|| self.operations.get("subscription").cloned());
        let registrations = self.registry().listeners_for(field_name);

        for registration in registrations {
            let result = match subscription_root.clone() {
                Some(object) => {
                    let state = registration.data.state.clone();
                    let selection_set = Arc::clone(&registration.selection_set);
                    let fragments = Arc::clone(&registration.data.fragments);
                    let variables = Arc::clone(&registration.data.variables);

                    async move {
                        match object
                            .resolve(state, selection_set, fragments, variables)
                            .await
                        {
                            Ok(data) => document(data),
                            Err(err) => error_document(err),
                        }
                    }
                    .boxed()
                }
                None => futures::future::ready(error_document(SchemaError::new(
                    "Unknown operation type: subscription",
                )))
                .boxed(),
            };

            (registration.callback)(result);
        }
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn registry_is_consistent(&self) -> bool {
        self.registry().is_consistent()
    }
}

/// Wraps resolved data as a response document.
pub(crate) fn document(data: Value) -> Value {
    let mut document = MapValue::with_capacity(1);

    document.add_field("data", data);

    Value::Map(document)
}

/// Wraps a failure as a response document with null data.
pub(crate) fn error_document(err: SchemaError) -> Value {
    let mut document = MapValue::with_capacity(2);

    document.add_field("data", Value::Null);
    document.add_field("errors", err.into_errors_value());

    Value::Map(document)
}

/// Finds the single operation definition of `root` to interpret.
///
/// With `subscription` set, only `subscription` operations are considered;
/// otherwise `subscription` operations are ignored and the operation kind
/// defaults to `"query"` when absent. A non-empty `operation_name` filters
/// by name; without one, exactly one candidate must remain.
fn select_operation<'a>(
    root: &'a AstNode,
    operation_name: &str,
    subscription: bool,
) -> FieldResult<(&'a Arc<AstNode>, String)> {
    let noun = if subscription {
        "subscription"
    } else {
        "operation"
    };
    let mut selected: Option<(&Arc<AstNode>, String)> = None;

    for operation in root.filter_children(NodeKind::OperationDefinition) {
        let kind = operation
            .find_child(NodeKind::OperationType)
            .map_or("query", |child| child.content());

        if subscription != (kind == "subscription") {
            continue;
        }

        let name = operation
            .find_child(NodeKind::OperationName)
            .map(|child| child.content())
            .unwrap_or_default();

        if !operation_name.is_empty() && name != operation_name {
            continue;
        }

        if selected.is_some() {
            let position = operation.position();
            let mut error = if operation_name.is_empty() {
                format!("No operationName specified with extra {noun}")
            } else {
                format!("Duplicate {noun}")
            };

            if !name.is_empty() {
                error.push_str(&format!(" name: {name}"));
            }

            error.push_str(&format!(
                " line: {} column: {}",
                position.line(),
                position.column(),
            ));

            return Err(SchemaError::new(error));
        }

        selected = Some((operation, kind.into()));
    }

    selected.ok_or_else(|| {
        let mut error = "Missing operation".to_owned();

        if !operation_name.is_empty() {
            error.push_str(&format!(" name: {operation_name}"));
        }

        SchemaError::new(error)
    })
}

/// Filters the request variables down to the ones declared by the
/// operation: caller-supplied value first, then the declared default, then
/// `null`.
fn coerce_variables(operation: &AstNode, variables: &MapValue) -> FieldResult<MapValue> {
    let mut coerced = MapValue::new();

    for variable in operation.filter_children(NodeKind::Variable) {
        let Some(name) = variable.find_child(NodeKind::VariableName) else {
            continue;
        };
        let content = name.content();
        let name = content.strip_prefix('$').unwrap_or(content);

        let value = if let Some(value) = variables.get_field_value(name) {
            value.clone()
        } else if let Some(default) = variable.find_child(NodeKind::DefaultValue) {
            match default.children().first() {
                Some(node) => ValueVisitor::new(variables).visit(node)?,
                None => Value::Null,
            }
        } else {
            Value::Null
        };

        coerced.add_field(name, value);
    }

    Ok(coerced)
}

/// The selection set of an operation definition; a missing one resolves
/// like an empty selection.
fn operation_selection_set(operation: &AstNode) -> Arc<AstNode> {
    operation.find_child(NodeKind::SelectionSet).map_or_else(
        || AstNode::new(NodeKind::SelectionSet, "").shared(),
        Arc::clone,
    )
}
