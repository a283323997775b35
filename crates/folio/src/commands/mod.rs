//! CLI command implementations.

pub(crate) mod nginx;
pub(crate) mod render;
pub(crate) mod serve;

pub(crate) use nginx::NginxArgs;
pub(crate) use render::RenderArgs;
pub(crate) use serve::ServeArgs;
