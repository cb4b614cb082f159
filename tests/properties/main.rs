//! Property-based test suite entry point.

mod search_properties;
