//! Response middleware.

pub(crate) mod cache;
pub(crate) mod security;
