//! Expansion of configuration strings.
//!
//! - `$name$` - replaced with the site name (paths only)
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//! - leading `~` - expands to the home directory (paths only)

use std::path::PathBuf;

use crate::ConfigError;

/// Placeholder for the site name in `path`.
pub const NAME_PLACEHOLDER: &str = "$name$";

/// Expand environment variable references in a string.
///
/// Only braced references are recognized. Strings without `${` are
/// returned unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    shellexpand::env_with_context(value, |var| -> Result<Option<String>, LookupError> {
        match std::env::var(var) {
            Ok(val) => Ok(Some(val)),
            Err(_) => Err(LookupError {
                var_name: var.to_owned(),
            }),
        }
    })
    .map(std::borrow::Cow::into_owned)
    .map_err(|e| ConfigError::EnvVar {
        field: field.to_owned(),
        message: format!("${{{0}}} not set", e.cause.var_name),
    })
}

/// Expand a site content path.
///
/// The name placeholder is substituted first so a site name can never be
/// mistaken for a variable reference.
pub(crate) fn expand_path(value: &str, site_name: &str, field: &str) -> Result<PathBuf, ConfigError> {
    let named = value.replace(NAME_PLACEHOLDER, site_name);
    let expanded = expand_env(&named, field)?;
    Ok(PathBuf::from(shellexpand::tilde(&expanded).as_ref()))
}

/// Error returned when environment variable lookup fails.
struct LookupError {
    var_name: String,
}
