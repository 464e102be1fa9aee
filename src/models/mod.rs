//! Data models for the LordSMP community site.
//!
//! Field names serialize as camelCase to match the site frontend.

mod application;
mod member;
mod rule;
mod status;
mod user;

pub use application::*;
pub use member::*;
pub use rule::*;
pub use status::*;
pub use user::*;
