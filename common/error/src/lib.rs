//! Shared error classification for the toolrun workspace.
//!
//! Every crate defines its own snafu error enum and implements [`ErrorExt`]
//! so callers can classify failures by [`StatusCode`] without knowing the
//! concrete type.

mod ext;
mod status_code;

pub use ext::ErrorExt;
pub use snafu::Location;
pub use status_code::StatusCategory;
pub use status_code::StatusCode;
pub use status_code::StatusMeta;
