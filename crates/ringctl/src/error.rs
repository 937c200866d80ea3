//! The facade-level error type: every error a caller of this crate can
//! see, whether it came from loading configuration or from driving the
//! topology coordinator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RingCtlError {
    #[error(transparent)]
    Config(#[from] ringctl_config::ConfigError),

    #[error(transparent)]
    Coordinator(#[from] ringctl_coord::CoordinatorError),
}

pub type Result<T> = std::result::Result<T, RingCtlError>;
