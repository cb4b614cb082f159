//! Storage layer for facfind
//!
//! Read-only access to the canonical faculty database.

pub mod sqlite;

pub use sqlite::{FACULTY_SCHEMA, FacultyProfile, FacultyStore, FacultyType, PhoneNumbers};
