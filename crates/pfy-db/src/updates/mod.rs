//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some`
//! fields generate SET clauses in the dynamic UPDATE SQL. `Option<Option<T>>`
//! distinguishes "leave alone" from "clear".

pub mod category;
pub mod group;
pub mod task;
