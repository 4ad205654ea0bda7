//! ID prefix constants.
//!
//! Every entity id is `<prefix>-<8 hex chars>`, generated by the database
//! layer (`PfyDb::generate_id`).

pub const PREFIX_USER: &str = "usr";
pub const PREFIX_GROUP: &str = "grp";
pub const PREFIX_CATEGORY: &str = "cat";
pub const PREFIX_TASK: &str = "tsk";
pub const PREFIX_COMMENT: &str = "cmt";
pub const PREFIX_NOTIFICATION: &str = "ntf";

/// All prefixes, for exhaustive id-format tests.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_USER,
    PREFIX_GROUP,
    PREFIX_CATEGORY,
    PREFIX_TASK,
    PREFIX_COMMENT,
    PREFIX_NOTIFICATION,
];
