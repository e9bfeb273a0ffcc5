//! Declarative macros shipped with the crate.

mod graphql_value;
