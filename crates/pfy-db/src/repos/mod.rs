//! Repository implementations, one file per collection.
//!
//! Each file adds methods to [`crate::service::PfyService`].

pub mod category;
pub mod comment;
pub mod group;
pub mod notification;
pub mod task;
pub mod user;
