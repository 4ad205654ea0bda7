//! Entity structs for all Projectify domain objects.
//!
//! Each entity maps to a table in the libSQL database (see
//! `pfy-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.

mod category;
mod comment;
mod group;
mod notification;
mod task;
mod user;

pub use category::Category;
pub use comment::TaskComment;
pub use group::Group;
pub use notification::{Notification, TASK_DUE_SOON, TASK_UPDATED};
pub use task::{Assignment, Attachment, Task};
pub use user::User;
