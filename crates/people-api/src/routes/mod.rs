//! # API Route Modules
//!
//! - `people`: person CRUD with demographic enrichment on write.

pub mod people;
