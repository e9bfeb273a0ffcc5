use std::{
    mem,
    sync::{Arc, Mutex},
};

use futures::future::BoxFuture;
use pretty_assertions::assert_eq;

use crate::{
    ast::{AstNode, SourcePosition},
    graphql_value,
    schema::{
        RootNode, TypeMap,
        subscriptions::{SubscriptionCallback, SubscriptionParams},
    },
    value::{MapValue, Value},
};

use super::{
    argument, bool_value, directive, directives, document, field, operation_definition,
    query_root_object, selection_set, star_wars_root, variable_definition, variable_value,
};

type Delivered = Arc<Mutex<Vec<BoxFuture<'static, Value>>>>;

fn collecting_callback() -> (Delivered, SubscriptionCallback) {
    let delivered = Delivered::default();
    let sink = Arc::clone(&delivered);

    (
        delivered,
        Box::new(move |response| sink.lock().expect("pristine lock").push(response)),
    )
}

async fn drain(delivered: &Delivered) -> Vec<Value> {
    let pending = mem::take(&mut *delivered.lock().expect("pristine lock"));
    let mut responses = Vec::with_capacity(pending.len());

    for response in pending {
        responses.push(response.await);
    }

    responses
}

fn message_subscription() -> SubscriptionParams {
    let query = document([operation_definition(
        Some("subscription"),
        None,
        Vec::new(),
        [field("newMessage").with_child(selection_set([field("body")]))],
    )]);

    SubscriptionParams {
        state: None,
        query,
        operation_name: String::new(),
        variables: MapValue::new(),
    }
}

#[tokio::test]
async fn delivers_until_unsubscribed() {
    let root = star_wars_root();
    let (delivered, callback) = collecting_callback();

    let key = root
        .subscribe(message_subscription(), callback)
        .expect("subscribed");
    assert!(root.registry_is_consistent());

    root.deliver("newMessage", None);
    root.unsubscribe(key);
    assert!(root.registry_is_consistent());
    root.deliver("newMessage", None);

    assert_eq!(
        drain(&delivered).await,
        [graphql_value!({"data": {"newMessage": {"body": "hello"}}})],
    );
}

#[tokio::test]
async fn events_on_other_fields_are_not_delivered() {
    let root = star_wars_root();
    let (delivered, callback) = collecting_callback();

    root.subscribe(message_subscription(), callback)
        .expect("subscribed");
    root.deliver("memberJoined", None);

    assert_eq!(drain(&delivered).await, Vec::<Value>::new());
}

#[tokio::test]
async fn deliveries_run_in_registration_order() {
    let root = star_wars_root();
    let order = Arc::new(Mutex::new(Vec::new()));

    for tag in ["first", "second", "third"] {
        let order = Arc::clone(&order);

        root.subscribe(
            message_subscription(),
            Box::new(move |_| order.lock().expect("pristine lock").push(tag)),
        )
        .expect("subscribed");
    }

    root.deliver("newMessage", None);

    assert_eq!(
        *order.lock().expect("pristine lock"),
        ["first", "second", "third"],
    );
}

#[tokio::test]
async fn keys_compact_on_unsubscribe() {
    let root = star_wars_root();

    let subscribe = |root: &RootNode| {
        let (_, callback) = collecting_callback();

        root.subscribe(message_subscription(), callback)
            .expect("subscribed")
    };

    let first = subscribe(&root);
    let second = subscribe(&root);
    assert_eq!((first, second), (0, 1));

    // Dropping the highest key lowers the counter again.
    root.unsubscribe(second);
    assert_eq!(subscribe(&root), 1);

    // Dropping a lower key keeps the counter just past the maximum.
    root.unsubscribe(first);
    assert_eq!(subscribe(&root), 2);
    assert!(root.registry_is_consistent());

    // A full drain resets the counter.
    root.unsubscribe(1);
    root.unsubscribe(2);
    assert_eq!(subscribe(&root), 0);
    assert!(root.registry_is_consistent());
}

#[tokio::test]
async fn stored_variables_apply_on_every_delivery() {
    let root = star_wars_root();
    let (delivered, callback) = collecting_callback();

    let body = field("body").with_child(directives([directive(
        "include",
        vec![argument("if", variable_value("withBody"))],
    )]));
    let query = document([operation_definition(
        Some("subscription"),
        None,
        vec![variable_definition("withBody", Some(bool_value(false)))],
        [field("newMessage").with_child(selection_set([body, field("sender")]))],
    )]);

    root.subscribe(
        SubscriptionParams {
            state: None,
            query,
            operation_name: String::new(),
            variables: MapValue::new(),
        },
        callback,
    )
    .expect("subscribed");

    root.deliver("newMessage", None);

    assert_eq!(
        drain(&delivered).await,
        [graphql_value!({"data": {"newMessage": {"sender": "R2-D2"}}})],
    );
}

#[tokio::test]
async fn explicit_subscription_object_overrides_the_default() {
    let root = star_wars_root();
    let (delivered, callback) = collecting_callback();

    root.subscribe(message_subscription(), callback)
        .expect("subscribed");

    let mut resolvers = crate::ResolverMap::default();
    resolvers.insert(
        "newMessage".into(),
        Box::new(|params| {
            use crate::types::ResolveValue as _;

            let mut resolvers = crate::ResolverMap::default();
            resolvers.insert("body".into(), super::resolve_str("goodbye"));

            Arc::new(crate::Object::new(
                crate::TypeNames::from_iter(["Message".into()]),
                resolvers,
            ))
            .resolve_value(params)
        }),
    );
    let replacement = Arc::new(crate::Object::new(
        crate::TypeNames::from_iter(["Subscription".into()]),
        resolvers,
    ));

    root.deliver("newMessage", Some(replacement));

    assert_eq!(
        drain(&delivered).await,
        [graphql_value!({"data": {"newMessage": {"body": "goodbye"}}})],
    );
}

#[tokio::test]
async fn missing_subscription_root_delivers_an_error_document() {
    let root = RootNode::new(TypeMap::from_iter([(
        "query".to_owned(),
        query_root_object() as Arc<dyn crate::ObjectType>,
    )]));
    let (delivered, callback) = collecting_callback();

    root.subscribe(message_subscription(), callback)
        .expect("subscribed");
    root.deliver("newMessage", None);

    assert_eq!(
        drain(&delivered).await,
        [graphql_value!({
            "data": null,
            "errors": [{"message": "Unknown operation type: subscription"}],
        })],
    );
}

#[test]
fn subscribe_requires_a_subscription_operation() {
    let root = star_wars_root();
    let (_, callback) = collecting_callback();

    let query_only = document([super::query([field("a")])]);
    let err = root
        .subscribe(
            SubscriptionParams {
                state: None,
                query: query_only,
                operation_name: String::new(),
                variables: MapValue::new(),
            },
            callback,
        )
        .expect_err("no subscription operation");

    assert_eq!(err.messages(), ["Missing operation"]);
}

#[test]
fn duplicate_subscriptions_without_a_name_fail() {
    let root = star_wars_root();
    let (_, callback) = collecting_callback();

    let second: AstNode = operation_definition(
        Some("subscription"),
        Some("Second"),
        Vec::new(),
        [field("newMessage")],
    )
    .at(SourcePosition::new(5, 1));
    let query = document([
        operation_definition(Some("subscription"), None, Vec::new(), [field("newMessage")]),
        second,
    ]);

    let err = root
        .subscribe(
            SubscriptionParams {
                state: None,
                query,
                operation_name: String::new(),
                variables: MapValue::new(),
            },
            callback,
        )
        .expect_err("duplicate subscription");

    assert_eq!(
        err.messages(),
        ["No operationName specified with extra subscription name: Second line: 5 column: 1"],
    );
}

#[tokio::test]
async fn unsubscribing_twice_is_a_no_op() {
    let root = star_wars_root();
    let (delivered, callback) = collecting_callback();

    let key = root
        .subscribe(message_subscription(), callback)
        .expect("subscribed");

    root.unsubscribe(key);
    root.unsubscribe(key);
    root.deliver("newMessage", None);

    assert_eq!(drain(&delivered).await, Vec::<Value>::new());
    assert!(root.registry_is_consistent());
}
