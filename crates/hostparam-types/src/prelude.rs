pub use crate::error::{ClResult, Error};
pub use crate::scope::{ScopeKind, ScopeRef};
pub use crate::types::{ParamId, Patch, RefId, Timestamp};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
