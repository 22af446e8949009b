//! Error type shared by the fallible parts of the crate.
//!
//! Sampling, interpolation and layout never fail: they degrade to inert
//! defaults. Errors only come from parsing user-supplied configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Anchor name other than `top`, `center` or `bottom`
    #[error("Invalid trigger anchor: {0:?}")]
    InvalidAnchor(String),

    /// Trigger position that is not `"<element> <viewport>"`
    #[error("Invalid trigger position: {0:?} (expected e.g. \"top bottom\")")]
    InvalidTriggerPosition(String),

    /// Style value that is not a number, `number+unit` or `fn(number unit)`
    #[error("Invalid style value: {0:?}")]
    InvalidStyleValue(String),

    /// Configuration that parsed but failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Browser API failure (missing window, canvas context, ...)
    #[cfg(feature = "web")]
    #[error("Web error: {0}")]
    Web(String),
}

pub type Result<T> = std::result::Result<T, Error>;
