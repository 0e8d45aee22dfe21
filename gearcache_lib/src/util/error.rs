use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CacheError {
    InvalidConfig { key: String, value: String },
    MissingField(&'static str),

    Serde(serde_json::Error),
    Prometheus(prometheus::Error),
    Io(std::io::Error),
}

impl CacheError {
    /// Config errors are caused by whoever started us, everything else is on our side.
    pub fn is_config_error(&self) -> bool {
        matches!(self, CacheError::InvalidConfig { .. })
    }
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::InvalidConfig { key, value } => {
                write!(f, "Invalid value for config option {}: {:?}", key, value)
            }
            CacheError::MissingField(field) => write!(f, "Gateway frame is missing the {} field", field),
            CacheError::Serde(e) => write!(f, "Serde error: {}", e),
            CacheError::Prometheus(e) => write!(f, "Prometheus error: {}", e),
            CacheError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Serde(e) => Some(e),
            CacheError::Prometheus(e) => Some(e),
            CacheError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serde(e)
    }
}

impl From<prometheus::Error> for CacheError {
    fn from(e: prometheus::Error) -> Self {
        CacheError::Prometheus(e)
    }
}

impl From<std::io::Error> for CacheError {
    fn from(e: std::io::Error) -> Self {
        CacheError::Io(e)
    }
}
