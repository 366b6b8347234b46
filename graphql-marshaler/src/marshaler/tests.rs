use std::collections::HashMap;

use pretty_assertions::assert_eq;
use test_log::test;

use super::*;

struct Example;

impl QueryShape for Example {
    fn shape() -> Shape {
        Shape::record::<Self>([
            Field::of::<String>("Message").json("message"),
            Field::of::<bool>("Boolean").json("boolean"),
            Field::of::<i64>("Number").json("number"),
        ])
    }
}

struct ExampleQuery;

impl QueryShape for ExampleQuery {
    fn shape() -> Shape {
        Shape::record::<Self>([Field::of::<Example>("Example")
            .json("example")
            .params("name:Int")])
    }
}

#[test]
fn converts_a_basic_shape() {
    let mut marshaler = Marshaler::new().with_indent_width(2);
    let query = marshaler.marshal_to_graphql::<ExampleQuery>(&[]).unwrap();
    assert_eq!(
        query,
        "{\n  example{\n    message\n    boolean\n    number\n  }\n}\n"
    );
}

#[test]
fn rendering_is_deterministic() {
    let first = marshal::<ExampleQuery>().unwrap().to_string();
    let second = marshal::<ExampleQuery>().unwrap().to_string();
    assert_eq!(first, second);
}

#[test]
fn declared_arguments_come_from_params() {
    let marshaler = marshal::<ExampleQuery>().unwrap();
    let example = &marshaler.root().unwrap().sub_fields()[0];
    assert_eq!(example.name(), "example");
    assert_eq!(example.arguments().get("name").map(String::as_str), Some("Int"));
    assert!(example.required_arguments().is_empty());
}

#[derive(Default)]
struct SomeMock;

impl ProducesSelection for SomeMock {
    fn marshal_gql(&self, _marshaler: &Marshaler) -> Result<Vec<QueryPart>, BoxError> {
        Ok(vec![
            QueryPart::new("someMockField1").with_sub_fields([
                QueryPart::new("someDeepMock"),
                QueryPart::new("someotherDeepMock"),
            ]),
            QueryPart::new("someMockField2"),
        ])
    }
}

impl QueryShape for SomeMock {
    fn shape() -> Shape {
        Shape::custom::<Self>()
    }
}

struct MockHolder<T>(T);

impl<T: QueryShape + 'static> QueryShape for MockHolder<T> {
    fn shape() -> Shape {
        Shape::record::<Self>([Field::of::<T>("SomeMock").json("someMock")])
    }
}

struct MockQuery<T>(T);

impl<T: QueryShape + 'static> QueryShape for MockQuery<T> {
    fn shape() -> Shape {
        Shape::record::<Self>([Field::of::<MockHolder<T>>("Example")
            .json("example")
            .params("name:Int")])
    }
}

const MOCK_QUERY: &str = r#"{
    example{
        someMock{
            someMockField1{
                someDeepMock
                someotherDeepMock
            }
            someMockField2
        }
    }
}
"#;

#[test]
fn custom_selections_become_sibling_sub_fields() {
    let marshaler = marshal::<MockQuery<SomeMock>>().unwrap();
    assert_eq!(marshaler.to_string(), MOCK_QUERY);
}

#[test]
fn custom_selections_inside_sequences() {
    let marshaler = marshal::<MockQuery<Vec<SomeMock>>>().unwrap();
    assert_eq!(marshaler.to_string(), MOCK_QUERY);
}

struct WithOmitted;

impl QueryShape for WithOmitted {
    fn shape() -> Shape {
        Shape::record::<Self>([Field::of::<OmitExample>("Example")
            .json("example")
            .params("name:Int")])
    }
}

struct OmitExample;

impl QueryShape for OmitExample {
    fn shape() -> Shape {
        Shape::record::<Self>([
            Field::of::<String>("Message").json("message"),
            Field::of::<bool>("Boolean").json("boolean"),
            Field::of::<i32>("Number").json("number"),
            Field::of::<String>("Omit")
                .json("will_omit_in_gql")
                .gql("omit"),
            Field::of::<String>("SomeValue"),
            Field::of::<Vec<Example>>("Nested").json("nested").omit(),
        ])
    }
}

#[test]
fn omitted_fields_are_skipped() {
    let query = Marshaler::new()
        .with_indent_width(2)
        .marshal_to_graphql::<WithOmitted>(&[])
        .unwrap();
    assert_eq!(
        query,
        r#"{
  example{
    message
    boolean
    number
    SomeValue
  }
}
"#
    );
}

struct DeepOmit;

impl QueryShape for DeepOmit {
    fn shape() -> Shape {
        Shape::record::<Self>([Field::of::<Option<Box<WithOmitted>>>("outer").json("outer")])
    }
}

#[test]
fn omitted_fields_are_skipped_at_any_depth() {
    let query = marshal::<DeepOmit>().unwrap().to_string();
    assert!(query.contains("SomeValue"));
    assert!(!query.contains("will_omit_in_gql"));
    assert!(!query.contains("nested"));
}

struct Aliased;

impl QueryShape for Aliased {
    fn shape() -> Shape {
        Shape::record::<Self>([
            Field::of::<String>("Message")
                .gql("message")
                .json("thisValueIsForJsonOnly"),
            Field::of::<bool>("Boolean").json("boolean"),
        ])
    }
}

#[test]
fn json_and_gql_names_render_as_an_alias() {
    let marshaler = marshal::<Aliased>().unwrap();
    assert_eq!(
        marshaler.to_string(),
        "{\n    thisValueIsForJsonOnly: message\n    boolean\n}\n"
    );
}

struct TestExample;

impl QueryShape for TestExample {
    fn shape() -> Shape {
        Shape::record::<Self>([Field::of::<String>("Message").json("tst")])
    }
}

struct ArrayHolder;

impl QueryShape for ArrayHolder {
    fn shape() -> Shape {
        Shape::record::<Self>([Field::of::<Vec<TestExample>>("Test")
            .json("example")
            .params("name:Int")])
    }
}

struct ArrayQuery;

impl QueryShape for ArrayQuery {
    fn shape() -> Shape {
        Shape::record::<Self>([Field::of::<ArrayHolder>("Example").json("test")])
    }
}

#[test]
fn sequences_select_their_element_once() {
    let query = Marshaler::new()
        .with_indent_width(2)
        .marshal_to_graphql::<ArrayQuery>(&[])
        .unwrap();
    assert_eq!(query, "{\n  test{\n    example{\n      tst\n    }\n  }\n}\n");
}

struct Pointers;

impl QueryShape for Pointers {
    fn shape() -> Shape {
        Shape::record::<Self>([
            Field::of::<Option<Example>>("absent").json("absent"),
            Field::of::<Box<Example>>("boxed").json("boxed"),
        ])
    }
}

#[test]
fn references_are_selected_as_their_pointee() {
    let marshaler = marshal::<Pointers>().unwrap();
    let root = marshaler.root().unwrap();
    assert_eq!(root.sub_fields().len(), 2);
    for part in root.sub_fields() {
        let names: Vec<_> = part.sub_fields().iter().map(QueryPart::name).collect();
        assert_eq!(names, ["message", "boolean", "number"]);
    }
}

#[test]
fn marks_arguments_while_marshaling() {
    struct TwoArgs;

    impl QueryShape for TwoArgs {
        fn shape() -> Shape {
            Shape::record::<Self>([Field::of::<Aliased>("Example")
                .json("example")
                .params("name:Int, foo:String")])
        }
    }

    let mut marshaler = Marshaler::new();
    let query = marshaler
        .marshal_to_graphql::<TwoArgs>(&["name", "foo"])
        .unwrap();
    assert_eq!(
        marshaler.root().unwrap().collect_required_arguments(),
        vec!["$name:Int", "$foo:String"]
    );
    assert!(query.starts_with("{\n    example(name:$name, foo:$foo){\n"));

    let mut marshaler = marshal::<TwoArgs>().unwrap();
    marshaler.add_to_args(["name", "foo", "name"]);
    assert_eq!(marshaler.root().unwrap().collect_required_arguments().len(), 2);
}

#[test]
fn adding_arguments_before_building_is_ignored() {
    let mut marshaler = Marshaler::new();
    marshaler.add_to_args(["name"]);
    assert!(marshaler.root().is_none());
    assert_eq!(marshaler.to_string(), "");
}

#[test]
fn root_must_be_a_record() {
    let mut marshaler = Marshaler::new();
    assert_eq!(
        marshaler.marshal::<String>().unwrap_err(),
        MarshalError::InvalidInputKind { kind: "scalar" }
    );
    assert_eq!(
        marshaler.marshal::<Vec<Example>>().unwrap_err(),
        MarshalError::InvalidInputKind { kind: "sequence" }
    );
    assert!(marshaler.root().is_none());

    // references to records are fine
    assert!(marshaler.marshal::<Option<Box<ExampleQuery>>>().is_ok());
}

struct WithMap;

impl QueryShape for WithMap {
    fn shape() -> Shape {
        Shape::record::<Self>([
            Field::of::<Example>("example").json("example"),
            Field::of::<HashMap<String, String>>("lookup").json("lookup"),
        ])
    }
}

struct WithMapQuery;

impl QueryShape for WithMapQuery {
    fn shape() -> Shape {
        Shape::record::<Self>([Field::of::<WithMap>("inner").json("inner")])
    }
}

#[test]
fn unsupported_kinds_abort_the_build() {
    let mut marshaler = Marshaler::new();
    assert_eq!(
        marshaler.marshal::<WithMapQuery>().unwrap_err(),
        MarshalError::UnsupportedFieldKind {
            field: "inner.lookup".to_string(),
            kind: "map",
        }
    );
    assert!(marshaler.root().is_none());
}

struct Node;

impl QueryShape for Node {
    fn shape() -> Shape {
        Shape::record::<Self>([
            Field::of::<String>("id").json("id"),
            Field::of::<Vec<Node>>("children").json("children"),
        ])
    }
}

#[test]
fn cyclic_shapes_are_rejected() {
    assert_eq!(
        marshal::<Node>().unwrap_err(),
        MarshalError::CyclicShape {
            type_name: std::any::type_name::<Node>(),
            field: "children".to_string(),
        }
    );
}

struct Twice;

impl QueryShape for Twice {
    fn shape() -> Shape {
        Shape::record::<Self>([
            Field::of::<TestExample>("first").json("first"),
            Field::of::<TestExample>("second").json("second"),
        ])
    }
}

#[test]
fn sibling_fields_may_share_a_type() {
    assert_eq!(
        marshal::<Twice>().unwrap().to_string(),
        "{\n    first{\n        tst\n    }\n    second{\n        tst\n    }\n}\n"
    );
}

#[derive(Default)]
struct FailingMock;

impl ProducesSelection for FailingMock {
    fn marshal_gql(&self, _marshaler: &Marshaler) -> Result<Vec<QueryPart>, BoxError> {
        Err("no selection available".into())
    }
}

impl QueryShape for FailingMock {
    fn shape() -> Shape {
        Shape::custom::<Self>()
    }
}

#[test]
fn custom_selection_errors_propagate() {
    assert_eq!(
        marshal::<MockQuery<FailingMock>>().unwrap_err(),
        MarshalError::SelectionProducer {
            field: "Example.SomeMock".to_string(),
            reason: "no selection available".to_string(),
        }
    );
}

struct Embedding;

impl ProducesSelection for Embedding {
    fn marshal_gql(&self, marshaler: &Marshaler) -> Result<Vec<QueryPart>, BoxError> {
        Ok(vec![
            QueryPart::new("__typename"),
            QueryPart::new("example").with_sub_fields(marshaler.selection_of::<Example>()?),
        ])
    }
}

struct EmbeddingQuery;

impl QueryShape for EmbeddingQuery {
    fn shape() -> Shape {
        Shape::record::<Self>([
            Field::with_shape("search", || {
                Shape::custom_with(|| Box::new(Embedding) as Box<dyn ProducesSelection>)
            })
            .json("search"),
        ])
    }
}

#[test]
fn custom_selections_can_embed_described_types() {
    assert_eq!(
        marshal::<EmbeddingQuery>().unwrap().to_string(),
        r#"{
    search{
        __typename
        example{
            message
            boolean
            number
        }
    }
}
"#
    );
}

struct Outer;

impl QueryShape for Outer {
    fn shape() -> Shape {
        Shape::record::<Self>([Field::of::<EmbedsOuter>("inner").json("inner")])
    }
}

#[derive(Default)]
struct EmbedsOuter;

impl ProducesSelection for EmbedsOuter {
    fn marshal_gql(&self, marshaler: &Marshaler) -> Result<Vec<QueryPart>, BoxError> {
        Ok(marshaler.selection_of::<Outer>()?)
    }
}

impl QueryShape for EmbedsOuter {
    fn shape() -> Shape {
        Shape::custom::<Self>()
    }
}

#[test]
fn cycles_through_custom_selections_are_rejected() {
    let mut marshaler = Marshaler::new();
    assert_eq!(
        marshaler.marshal::<Outer>().unwrap_err(),
        MarshalError::CyclicShape {
            type_name: std::any::type_name::<Outer>(),
            field: "inner".to_string(),
        }
    );
    assert!(marshaler.root().is_none());

    // the trail is unwound after a failed build
    assert_eq!(
        marshaler.marshal::<Example>().unwrap().to_string(),
        "{\n    message\n    boolean\n    number\n}\n"
    );
}

#[test]
fn selection_of_outside_a_build_starts_a_fresh_walk() {
    let marshaler = Marshaler::new();
    let parts = marshaler.selection_of::<Example>().unwrap();
    let names: Vec<_> = parts.iter().map(QueryPart::name).collect();
    assert_eq!(names, ["message", "boolean", "number"]);
}

struct BadParams;

impl QueryShape for BadParams {
    fn shape() -> Shape {
        Shape::record::<Self>([Field::of::<Example>("Example")
            .json("example")
            .params("name:Int, broken")])
    }
}

#[test]
fn malformed_argument_declarations_are_rejected() {
    assert_eq!(
        marshal::<BadParams>().unwrap_err(),
        MarshalError::InvalidArgumentDeclaration {
            field: "Example".to_string(),
            declaration: "broken".to_string(),
        }
    );
}

#[test]
fn argument_declarations_are_trimmed() {
    assert_eq!(
        parse_argument_declaration(" name : Int ,foo:String, ").unwrap(),
        vec![("name", "Int"), ("foo", "String")]
    );
    assert_eq!(parse_argument_declaration(":Int").unwrap_err(), ":Int");
}

#[test]
fn building_twice_replaces_the_root() {
    let mut marshaler = Marshaler::new();
    marshaler.marshal::<TestExample>().unwrap();
    marshaler.marshal::<ExampleQuery>().unwrap();
    assert_eq!(marshaler.root().unwrap().sub_fields()[0].name(), "example");
}
