//! Integrations with other crates.

mod serde;
