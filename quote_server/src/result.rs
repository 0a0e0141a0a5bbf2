//! Crate-wide result alias tying operations to the crate's unified error type.
//! Most fallible server functions return `result::Result<T>`, which defaults the error
//! parameter to `crate::error::ServerError`, while still allowing
//! `result::Result<T, FetchError>` where a narrower error is wanted.

use crate::error::ServerError;

/// Convenient alias for `std::result::Result<T, ServerError>` used throughout the crate.
pub type Result<T, E = ServerError> = std::result::Result<T, E>;
