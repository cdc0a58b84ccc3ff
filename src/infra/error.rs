use thiserror::Error;

/// Failures raised while standing up or operating infrastructure,
/// as opposed to per-request repository errors.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("database failure: {0}")]
    Database(#[source] sqlx::Error),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl InfraError {
    pub fn database(err: sqlx::Error) -> Self {
        Self::Database(err)
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_variant_reports_the_underlying_failure() {
        let err = InfraError::database(sqlx::Error::PoolClosed);
        assert!(err.to_string().starts_with("database failure:"));
    }

    #[test]
    fn configuration_variant_carries_the_message() {
        let err = InfraError::configuration("database url is not configured");
        assert_eq!(
            err.to_string(),
            "invalid configuration: database url is not configured"
        );
    }
}
