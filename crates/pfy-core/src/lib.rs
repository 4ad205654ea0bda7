//! # pfy-core
//!
//! Core types, ID prefixes, and recipient resolution for Projectify.
//!
//! This crate provides the foundational types shared across all Projectify crates:
//! - Entity structs for all domain objects (users, groups, categories, tasks,
//!   comments, notifications)
//! - Status, priority, and role enums
//! - ID prefix constants
//! - Recipient resolution for task notifications
//! - Slug normalisation for categories
//! - Pagination options and response envelopes
//! - Read-side views produced by the task aggregation query

pub mod entities;
pub mod enums;
pub mod ids;
pub mod pagination;
pub mod recipients;
pub mod responses;
pub mod slug;
pub mod views;
