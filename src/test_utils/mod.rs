//! Shared test utilities for facfind.

pub mod fixtures;
pub mod logging;

pub use fixtures::{
    FIXTURE_DIMS, SearchFixture, bundle_for, document_text, sample_profiles, sample_records,
};
pub use logging::TestLogger;
