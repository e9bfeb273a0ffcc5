//! Abstract syntax tree contract consumed by the execution engine.
//!
//! The engine does not parse GraphQL itself. A parser produces a tree of
//! [`AstNode`]s and hands the document root to [`RootNode::resolve`]; the
//! engine only ever reads the tree. Nodes are shared through [`Arc`] so a
//! long-lived subscription can keep its query document and a reference to
//! the subscribed selection set alive without borrowing from the caller.
//!
//! [`RootNode::resolve`]: crate::RootNode::resolve

use std::{fmt, sync::Arc};

use derive_more::with_trait::Display;

/// A reference to a line and column in an input source file.
///
/// The values are stored exactly as the parser reported them; the engine
/// embeds them verbatim in error messages.
#[derive(Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{line}:{col}")]
pub struct SourcePosition {
    line: usize,
    col: usize,
}

impl SourcePosition {
    /// Creates a new [`SourcePosition`] from the provided `line` and `col`.
    #[must_use]
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// The line of the node in the input source.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// The column of the node in the input source.
    #[must_use]
    pub fn column(&self) -> usize {
        self.col
    }
}

/// Grammar rule that produced an [`AstNode`].
///
/// The engine dispatches on the kinds a GraphQL executable document can
/// contain. A few kinds (`Document`, `Argument`, `ArgumentName`,
/// `Directive`, `ObjectField`, `ObjectFieldName`, `FragmentName`,
/// `NamedType`) are never dispatched on directly: the engine traverses
/// through them positionally, reading a name from the first child and a
/// value from the last.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(missing_docs, reason = "variants mirror the grammar rule names")]
pub enum NodeKind {
    Document,
    OperationDefinition,
    OperationType,
    OperationName,
    Variable,
    VariableName,
    DefaultValue,
    FragmentDefinition,
    FragmentName,
    FragmentSpread,
    InlineFragment,
    TypeCondition,
    NamedType,
    SelectionSet,
    Field,
    FieldName,
    AliasName,
    Arguments,
    Argument,
    ArgumentName,
    Directives,
    Directive,
    DirectiveName,
    VariableValue,
    IntegerValue,
    FloatValue,
    StringValue,
    TrueKeyword,
    FalseKeyword,
    NullKeyword,
    EnumValue,
    ListValue,
    ObjectValue,
    ObjectField,
    ObjectFieldName,
}

impl NodeKind {
    /// Grammar rule name of this [`NodeKind`], as a parser would spell it.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::OperationDefinition => "operation_definition",
            Self::OperationType => "operation_type",
            Self::OperationName => "operation_name",
            Self::Variable => "variable",
            Self::VariableName => "variable_name",
            Self::DefaultValue => "default_value",
            Self::FragmentDefinition => "fragment_definition",
            Self::FragmentName => "fragment_name",
            Self::FragmentSpread => "fragment_spread",
            Self::InlineFragment => "inline_fragment",
            Self::TypeCondition => "type_condition",
            Self::NamedType => "named_type",
            Self::SelectionSet => "selection_set",
            Self::Field => "field",
            Self::FieldName => "field_name",
            Self::AliasName => "alias_name",
            Self::Arguments => "arguments",
            Self::Argument => "argument",
            Self::ArgumentName => "argument_name",
            Self::Directives => "directives",
            Self::Directive => "directive",
            Self::DirectiveName => "directive_name",
            Self::VariableValue => "variable_value",
            Self::IntegerValue => "integer_value",
            Self::FloatValue => "float_value",
            Self::StringValue => "string_value",
            Self::TrueKeyword => "true_keyword",
            Self::FalseKeyword => "false_keyword",
            Self::NullKeyword => "null_keyword",
            Self::EnumValue => "enum_value",
            Self::ListValue => "list_value",
            Self::ObjectValue => "object_value",
            Self::ObjectField => "object_field",
            Self::ObjectFieldName => "object_field_name",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Single node of a parsed GraphQL document.
///
/// Carries the grammar rule that matched, the matched source text, the
/// ordered child nodes and the source position where the match began. String
/// literals additionally carry their unescaped form, since `content` is the
/// raw source slice including quotes and escapes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AstNode {
    kind: NodeKind,
    content: String,
    unescaped: Option<String>,
    children: Vec<Arc<AstNode>>,
    position: SourcePosition,
}

impl AstNode {
    /// Creates a new [`AstNode`] of the provided `kind` with the matched
    /// source `content` and no children.
    #[must_use]
    pub fn new(kind: NodeKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            unescaped: None,
            children: Vec::new(),
            position: SourcePosition::default(),
        }
    }

    /// Attaches the source position where this node's match began.
    #[must_use]
    pub fn at(mut self, position: SourcePosition) -> Self {
        self.position = position;
        self
    }

    /// Attaches the unescaped form of a string literal.
    #[must_use]
    pub fn with_unescaped(mut self, unescaped: impl Into<String>) -> Self {
        self.unescaped = Some(unescaped.into());
        self
    }

    /// Appends a child node.
    #[must_use]
    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    /// Appends every node in `children`, in order.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = AstNode>) -> Self {
        self.children.extend(children.into_iter().map(Arc::new));
        self
    }

    /// Wraps this node for shared ownership.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// The grammar rule that produced this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Indicates whether this node was produced by the provided rule.
    #[must_use]
    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    /// The source text matched by this node.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The unescaped form of a string literal.
    ///
    /// Falls back to the raw content for nodes which carry no separate
    /// unescaped form.
    #[must_use]
    pub fn unescaped_content(&self) -> &str {
        self.unescaped.as_deref().unwrap_or(&self.content)
    }

    /// The ordered child nodes.
    #[must_use]
    pub fn children(&self) -> &[Arc<AstNode>] {
        &self.children
    }

    /// The source position where this node's match began.
    #[must_use]
    pub fn position(&self) -> SourcePosition {
        self.position
    }

    /// Finds the first direct child produced by `kind`.
    ///
    /// The search intentionally does not descend: a `field`'s own
    /// `directives` are its direct child, and anything nested under its
    /// selection set belongs to another selection.
    #[must_use]
    pub fn find_child(&self, kind: NodeKind) -> Option<&Arc<AstNode>> {
        self.children.iter().find(|child| child.is(kind))
    }

    /// Iterates over the direct children produced by `kind`, in order.
    pub fn filter_children(&self, kind: NodeKind) -> impl Iterator<Item = &Arc<AstNode>> {
        self.children.iter().filter(move |child| child.is(kind))
    }
}
