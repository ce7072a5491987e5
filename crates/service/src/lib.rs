//! CRUD services over the Questline stores.
//!
//! Everything here is ownership-scoped plumbing around the engine: boss and
//! task lifecycles, user provisioning, and the forest indexing shared by
//! both entity trees.

#![warn(missing_docs)]


mod boss;
mod forest;
mod task;
mod user;

pub use boss::{BossService, CreateBoss, UpdateBoss};
pub use forest::{would_create_cycle, ChildIndex};
pub use task::{CreateTask, TaskService, UpdateTask};
pub use user::UserService;
