use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum RfplayerError {
    #[error("Malformed device id (expected <protocol>_<device_id>): {0}")]
    MalformedDeviceId(String),

    #[error("Event for {0} carries no value")]
    MissingValue(String),

    #[error("Invalid value {value:?} for {id}: {source}")]
    InvalidValue {
        id: String,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("Entity already added: {0}")]
    AlreadyAdded(String),

    #[error("Discovery channel closed for category: {0}")]
    DiscoveryClosed(String),

    #[error("Failed to load config entry {path}: {reason}")]
    ConfigLoad { path: String, reason: String },

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RfplayerError>;
