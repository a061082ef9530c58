/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Staged mutations and their policy (ops.rs)
/// - The pending-operation queue (queue.rs) and pre-edit snapshot (snapshot.rs)
/// - The optimistic edit session (edit.rs)
/// - Batch save and early deletes (commit.rs)
/// - Color images and the presentation state machine (gallery.rs)
/// - Back-office accounts (users.rs)

pub mod commit;
pub mod data;
pub mod edit;
pub mod gallery;
pub mod ops;
pub mod queue;
pub mod snapshot;
pub mod users;
