//! Integration test suite entry point.

mod fallback_tests;
mod search_workflow_tests;
mod store_tests;
