//! Unit tests for the pipeline domain and services.

mod domain_tests;
mod ticket_tests;
