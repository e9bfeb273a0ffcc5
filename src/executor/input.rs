//! Builds [`Value`]s from the input value nodes of a request document.

use crate::{
    ast::{AstNode, NodeKind},
    error::{FieldResult, SchemaError},
    value::{MapValue, Value},
};

/// Visits input value nodes, building the [`Value`] representation of any
/// value hardcoded or referencing a variable in an operation.
pub(crate) struct ValueVisitor<'a> {
    variables: &'a MapValue,
}

impl<'a> ValueVisitor<'a> {
    pub(crate) fn new(variables: &'a MapValue) -> Self {
        Self { variables }
    }

    pub(crate) fn visit(&self, value: &AstNode) -> FieldResult<Value> {
        match value.kind() {
            NodeKind::VariableValue => self.visit_variable(value),
            NodeKind::IntegerValue => Self::visit_int_value(value),
            NodeKind::FloatValue => Self::visit_float_value(value),
            NodeKind::StringValue => Ok(Value::String(value.unescaped_content().into())),
            NodeKind::TrueKeyword | NodeKind::FalseKeyword => {
                Ok(Value::Bool(value.is(NodeKind::TrueKeyword)))
            }
            NodeKind::NullKeyword => Ok(Value::Null),
            NodeKind::EnumValue => Ok(Value::Enum(value.content().into())),
            NodeKind::ListValue => self.visit_list_value(value),
            NodeKind::ObjectValue => self.visit_object_value(value),
            _ => Ok(Value::Null),
        }
    }

    fn visit_variable(&self, variable: &AstNode) -> FieldResult<Value> {
        let content = variable.content();
        let name = content.strip_prefix('$').unwrap_or(content);

        match self.variables.get_field_value(name) {
            Some(value) => Ok(value.clone()),
            None => {
                let position = variable.position();

                Err(SchemaError::new(format!(
                    "Unknown variable name: {name} line: {} column: {}",
                    position.line(),
                    position.column(),
                )))
            }
        }
    }

    fn visit_int_value(value: &AstNode) -> FieldResult<Value> {
        value
            .content()
            .parse()
            .map(Value::Int)
            .map_err(|_| SchemaError::new("not an integer"))
    }

    fn visit_float_value(value: &AstNode) -> FieldResult<Value> {
        value
            .content()
            .parse()
            .map(Value::Float)
            .map_err(|_| SchemaError::new("not a float"))
    }

    fn visit_list_value(&self, list: &AstNode) -> FieldResult<Value> {
        let mut elements = Vec::with_capacity(list.children().len());

        for element in list.children() {
            elements.push(self.visit(element)?);
        }

        Ok(Value::List(elements))
    }

    fn visit_object_value(&self, object: &AstNode) -> FieldResult<Value> {
        let mut map = MapValue::with_capacity(object.children().len());

        for field in object.children() {
            let (Some(name), Some(value)) = (field.children().first(), field.children().last())
            else {
                continue;
            };

            map.add_field(name.content(), self.visit(value)?);
        }

        Ok(Value::Map(map))
    }
}
