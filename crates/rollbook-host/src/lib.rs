//! External collaborators for rollbook
//!
//! The core engine only consumes text: session lines, live logins, roster
//! pairs, display names. This crate defines the narrow trait contracts for
//! those inputs and provides two implementations:
//! - `DshLab`/`PasswdDirectory`: the real thing, shelling out to `dsh`
//!   across the lab machine group and scanning the system account directory
//! - `MockLab`: an in-memory stand-in for tests

mod mock;
mod traits;
#[cfg(unix)]
mod unix;

pub use mock::*;
pub use traits::*;
#[cfg(unix)]
pub use unix::*;
