use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("crt_trials must be a positive even number, got {0}")]
    CrtTrials(usize),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}
