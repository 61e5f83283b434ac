//! Request admission: origin resolution and per-origin rate limiting.

mod origin;
mod rate_limit;

pub use origin::{ClientOrigin, UNKNOWN_ORIGIN};
pub use rate_limit::{Admission, AdmissionController};
