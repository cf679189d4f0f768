//! In-memory store integration tests.
//!
//! Tests are organized into modules by functionality:
//! - `store_tests`: Atomic commits, reference checks and lookups
//! - `concurrency_tests`: Identifier uniqueness and serialized mutations

mod in_memory {
    pub mod helpers;

    mod concurrency_tests;
    mod store_tests;
}
