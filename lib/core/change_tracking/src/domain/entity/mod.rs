//! 领域实体

mod recent;
mod user;

pub use recent::*;
pub use user::*;
