//! Error type shared by the core and every adapter.

use crate::scope::ScopeRef;

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	// validation
	EmptyName,
	Whitespace(Box<str>),
	ValidationError(String),
	DuplicateName { name: Box<str>, scope: ScopeRef },
	ImmutableField(&'static str),

	// data defects
	UnknownScopeKind(Box<str>),
	AmbiguousOverride { name: Box<str>, scopes: Vec<ScopeRef> },
	/// Stored priority disagrees with the scope kind's rank
	PriorityMismatch { scope: ScopeRef, priority: i32 },

	// collaborator boundary
	NotFound,
	PermissionDenied,
	StorageUnavailable,
	DbError,
	CodecError(String),
	ConfigError(String),

	// externals
	Io(std::io::Error),
}

impl Error {
	/// True for the input-defect family (empty name, whitespace, generic validation)
	pub fn is_validation(&self) -> bool {
		matches!(self, Error::EmptyName | Error::Whitespace(_) | Error::ValidationError(_))
	}
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::EmptyName => write!(f, "parameter name must not be empty"),
			Error::Whitespace(name) => {
				write!(f, "parameter name '{}' must not contain whitespace", name)
			}
			Error::ValidationError(reason) => write!(f, "validation error: {}", reason),
			Error::DuplicateName { name, scope } => {
				write!(f, "parameter '{}' already exists in scope {}", name, scope)
			}
			Error::ImmutableField(field) => write!(f, "field '{}' cannot be changed", field),
			Error::UnknownScopeKind(kind) => write!(f, "unknown scope kind '{}'", kind),
			Error::AmbiguousOverride { name, scopes } => {
				write!(f, "ambiguous override for '{}' between", name)?;
				for scope in scopes {
					write!(f, " {}", scope)?;
				}
				Ok(())
			}
			Error::PriorityMismatch { scope, priority } => write!(
				f,
				"stored priority {} does not match {} (expected {})",
				priority,
				scope,
				scope.kind().priority()
			),
			Error::Io(err) => write!(f, "io error: {}", err),
			_ => write!(f, "{:?}", self),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Io(err) => Some(err),
			_ => None,
		}
	}
}


// vim: ts=4
