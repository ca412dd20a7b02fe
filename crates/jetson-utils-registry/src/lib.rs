//! Function registry for the jetson-utils extension module.
//!
//! Collects descriptor tables from every [`Contributor`] into one bounded,
//! sentinel-terminated [`FunctionRegistry`] and relays type registration.

mod contributor;
mod registry;

pub use contributor::{Contributor, Contributors};
pub use registry::{FunctionRegistry, MAX_FUNCTIONS};
