//! # pfy-notify
//!
//! Task notification fan-out for Projectify.
//!
//! - [`push`]: the live channel. One room per user id, any number of
//!   connections per room, best-effort delivery.
//! - [`dispatcher`]: resolves recipients, persists one notification per
//!   recipient through [`store`], and pushes each to its room.
//! - [`sweeper`]: the periodic due-date scan that drives the dispatcher.
//!
//! Nothing here raises into the caller's request path: per-recipient and
//! per-task failures are logged and counted.

pub mod dispatcher;
pub mod error;
pub mod push;
pub mod store;
pub mod sweeper;

pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{NotifyError, PushError};
pub use push::{PushChannel, PushMessage, RoomHub, RoomSubscription};
pub use store::NotificationStore;
pub use sweeper::{DueDateSweeper, SweepReport};
