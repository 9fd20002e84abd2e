//! Core data model for the file store.
//!
//! A single entity, [`file::FileRecord`], maps to the flat `files` table via
//! `sqlx::FromRow`.

pub mod file;
