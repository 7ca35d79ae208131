pub use hostparam_types::prelude::*;

// vim: ts=4
