#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(any(doc, test), doc = include_str!("../README.md"))]
#![cfg_attr(not(any(doc, test)), doc = env!("CARGO_PKG_NAME"))]

mod macros;

pub mod ast;
pub mod base64;
mod error;
pub mod executor;
mod integrations;
pub mod schema;
mod types;
mod value;


#[doc(inline)]
pub use futures::future::BoxFuture;

pub use crate::{
    ast::{AstNode, NodeKind, SourcePosition},
    error::{ExecutionResult, FieldResult, SchemaError},
    executor::{
        Fragment, FragmentMap, Object, ObjectType, RequestState, Resolver, ResolverMap,
        ResolverParams, TypeNames, collect_fragments,
    },
    schema::{
        RootNode, TypeMap,
        subscriptions::{
            SubscriptionCallback, SubscriptionKey, SubscriptionName, SubscriptionParams,
        },
    },
    types::{FromValue, ID, ResolveValue, find, require},
    value::{MapValue, Value},
};
