//! User directory and activity log.
//!
//! In-process stores for user records and the administrative activity trail.

pub mod activity;
pub mod users;

pub use activity::{
    ActivityEntry, ActivityFilter, ActivityLog, ActivityPage, Pagination, RequestOrigin,
};
pub use users::{DirectoryError, UserDirectory, UserRecord};
