use pretty_assertions::assert_eq;

use crate::{
    ast::SourcePosition,
    graphql_value,
    value::{MapValue, Value},
};

use super::{
    aliased_field, argument, arguments, document, field, fragment_definition, fragment_spread,
    inline_fragment, int_value, operation_definition, query, run_document, selection_set,
    star_wars_root, string_value,
};

#[tokio::test]
async fn resolves_a_nested_object_field() {
    let doc = document([query([
        field("hero").with_child(selection_set([field("name")])),
    ])]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({"data": {"hero": {"name": "R2-D2"}}}),
    );
}

#[tokio::test]
async fn keys_follow_selection_order() {
    let doc = document([query([
        field("b"),
        field("hero").with_child(selection_set([
            field("id"),
            field("name"),
            field("appearsIn"),
            field("primaryFunction"),
        ])),
        field("a"),
    ])]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({"data": {
            "b": "b",
            "hero": {
                "id": crate::Value::Id(b"2001".to_vec()),
                "name": "R2-D2",
                "appearsIn": [
                    crate::Value::Enum("NEW_HOPE".into()),
                    crate::Value::Enum("EMPIRE".into()),
                    crate::Value::Enum("JEDI".into()),
                ],
                "primaryFunction": "Astromech",
            },
            "a": "a",
        }}),
    );
}

#[tokio::test]
async fn aliases_rename_fields() {
    let doc = document([query([
        aliased_field("first", "a"),
        aliased_field("second", "a"),
    ])]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({"data": {"first": "a", "second": "a"}}),
    );
}

#[tokio::test]
async fn duplicate_aliases_from_fragment_merging_are_preserved() {
    let doc = document([
        query([field("a"), fragment_spread("Extra")]),
        fragment_definition("Extra", "Query", [field("a")]),
    ]);

    let response = run_document(&doc).await;
    let data = response
        .as_map()
        .and_then(|map| map.get_field_value("data"))
        .and_then(Value::as_map)
        .expect("data map");

    assert_eq!(data.field_count(), 2);
    assert_eq!(
        serde_json::to_string(&response).expect("serializable"),
        r#"{"data":{"a":"a","a":"a"}}"#,
    );
}

#[tokio::test]
async fn fragment_spreads_expand_in_place() {
    let doc = document([
        query([fragment_spread("HeroFields"), field("a")]),
        fragment_definition(
            "HeroFields",
            "Query",
            [field("hero").with_child(selection_set([field("name")]))],
        ),
    ]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({"data": {"hero": {"name": "R2-D2"}, "a": "a"}}),
    );
}

#[tokio::test]
async fn fragment_with_foreign_type_condition_is_skipped() {
    let doc = document([
        query([field("a"), fragment_spread("HumanFields")]),
        fragment_definition("HumanFields", "Human", [field("homePlanet")]),
    ]);

    assert_eq!(run_document(&doc).await, graphql_value!({"data": {"a": "a"}}));
}

#[tokio::test]
async fn inline_fragment_honors_type_condition() {
    let doc = document([query([
        inline_fragment(Some("Query"), [field("a")]),
        inline_fragment(Some("Human"), [field("homePlanet")]),
        inline_fragment(None, [field("b")]),
    ])]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({"data": {"a": "a", "b": "b"}}),
    );
}

#[tokio::test]
async fn unknown_fragment_fails_the_operation() {
    let spread = fragment_spread("Unknown").at(SourcePosition::new(1, 5));
    let doc = document([query([field("a"), spread])]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({
            "data": null,
            "errors": [{"message": "Unknown fragment name: Unknown line: 1 column: 5"}],
        }),
    );
}

#[tokio::test]
async fn unknown_field_fails_the_operation() {
    let unknown = field("starship").at(SourcePosition::new(3, 9));
    let doc = document([query([field("a"), unknown])]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({
            "data": null,
            "errors": [{"message": "Unknown field name: starship line: 3 column: 9"}],
        }),
    );
}

#[tokio::test]
async fn unknown_field_fails_even_when_skipped() {
    use super::{bool_value, directive, directives};

    let unknown = field("starship")
        .at(SourcePosition::new(1, 12))
        .with_child(directives([directive(
            "skip",
            vec![argument("if", bool_value(true))],
        )]));
    let doc = document([query([unknown])]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({
            "data": null,
            "errors": [{"message": "Unknown field name: starship line: 1 column: 12"}],
        }),
    );
}

#[tokio::test]
async fn resolver_failure_aborts_the_whole_operation() {
    let doc = document([query([field("a"), field("fail"), field("b")])]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({
            "data": null,
            "errors": [{"message": "hero unavailable"}],
        }),
    );
}

#[tokio::test]
async fn argument_coercion_failure_aborts_the_operation() {
    let doc = document([query([
        field("length").with_child(arguments([argument("of", int_value(42))])),
    ])]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({
            "data": null,
            "errors": [{"message": "Invalid argument: of message: not a string"}],
        }),
    );
}

#[tokio::test]
async fn arguments_reach_the_resolver() {
    let doc = document([query([
        field("length").with_child(arguments([argument("of", string_value("Astromech"))])),
    ])]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({"data": {"length": 9}}),
    );
}

#[tokio::test]
async fn named_operation_is_selected() {
    let doc = document([
        operation_definition(Some("query"), Some("First"), Vec::new(), [field("a")]),
        operation_definition(Some("query"), Some("Second"), Vec::new(), [field("b")]),
    ]);

    let response = star_wars_root()
        .resolve(None, &doc, "Second", MapValue::new())
        .await;

    assert_eq!(response, graphql_value!({"data": {"b": "b"}}));
}

#[tokio::test]
async fn duplicate_operations_without_a_name_fail() {
    let second = operation_definition(Some("query"), Some("Second"), Vec::new(), [field("b")])
        .at(SourcePosition::new(4, 1));
    let doc = document([
        operation_definition(Some("query"), Some("First"), Vec::new(), [field("a")]),
        second,
    ]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({
            "data": null,
            "errors": [{
                "message":
                    "No operationName specified with extra operation name: Second line: 4 column: 1",
            }],
        }),
    );
}

#[tokio::test]
async fn duplicate_operations_under_the_same_name_fail() {
    let second = operation_definition(Some("query"), Some("Twin"), Vec::new(), [field("b")])
        .at(SourcePosition::new(7, 3));
    let doc = document([
        operation_definition(Some("query"), Some("Twin"), Vec::new(), [field("a")]),
        second,
    ]);

    let response = star_wars_root()
        .resolve(None, &doc, "Twin", MapValue::new())
        .await;

    assert_eq!(
        response,
        graphql_value!({
            "data": null,
            "errors": [{"message": "Duplicate operation name: Twin line: 7 column: 3"}],
        }),
    );
}

#[tokio::test]
async fn missing_operation_fails() {
    let doc = document([fragment_definition("Lonely", "Query", [field("a")])]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({
            "data": null,
            "errors": [{"message": "Missing operation"}],
        }),
    );
}

#[tokio::test]
async fn missing_named_operation_reports_the_name() {
    let doc = document([operation_definition(
        Some("query"),
        Some("First"),
        Vec::new(),
        [field("a")],
    )]);

    let response = star_wars_root()
        .resolve(None, &doc, "Absent", MapValue::new())
        .await;

    assert_eq!(
        response,
        graphql_value!({
            "data": null,
            "errors": [{"message": "Missing operation name: Absent"}],
        }),
    );
}

#[tokio::test]
async fn unknown_operation_type_fails() {
    let mutation = operation_definition(Some("mutation"), Some("Save"), Vec::new(), [field("a")])
        .at(SourcePosition::new(1, 1));
    let doc = document([mutation]);

    assert_eq!(
        run_document(&doc).await,
        graphql_value!({
            "data": null,
            "errors": [{"message": "Unknown operation type: mutation name: Save line: 1 column: 1"}],
        }),
    );
}

#[tokio::test]
async fn subscriptions_are_ignored_by_resolve() {
    let doc = document([
        operation_definition(Some("subscription"), None, Vec::new(), [field("newMessage")]),
        query([field("a")]),
    ]);

    assert_eq!(run_document(&doc).await, graphql_value!({"data": {"a": "a"}}));
}

#[tokio::test]
async fn empty_selection_resolves_to_an_empty_map() {
    let doc = document([query([])]);

    assert_eq!(run_document(&doc).await, graphql_value!({"data": {}}));
}
