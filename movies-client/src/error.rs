use reqwest::StatusCode;
use service_core::error::AppError;
use thiserror::Error;

/// Failure of one step of the authenticated-request pipeline.
///
/// Variants are kept distinct all the way to the caller so that "not
/// authenticated", "catalog unavailable" and "catalog returned garbage"
/// remain distinguishable.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Identity provider discovery failed: {0}")]
    Discovery(String),

    #[error("User info request failed: {detail}")]
    UserInfo {
        status: Option<StatusCode>,
        detail: String,
    },

    #[error("Catalog request failed: {detail}")]
    CatalogRequest {
        status: Option<StatusCode>,
        detail: String,
    },

    #[error("Catalog response could not be decoded: {0}")]
    CatalogDecode(#[source] serde_json::Error),

    #[error("Timed out waiting for {operation}")]
    TransportTimeout { operation: &'static str },

    #[error("Catalog channel credentials unavailable: {0}")]
    ChannelCredentials(String),

    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },
}

impl ClientError {
    /// Map a transport-level `reqwest` failure, turning timeouts into
    /// [`ClientError::TransportTimeout`] and everything else into `other`.
    pub(crate) fn from_transport(
        err: reqwest::Error,
        operation: &'static str,
        other: impl FnOnce(String) -> ClientError,
    ) -> Self {
        if err.is_timeout() {
            tracing::warn!(operation, error = %err, "Upstream request timed out");
            ClientError::TransportTimeout { operation }
        } else {
            tracing::error!(operation, error = %err, "Upstream request failed");
            other(err.to_string())
        }
    }
}

impl From<ClientError> for AppError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::UserInfo {
                status: Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN),
                detail,
            } => AppError::Unauthorized(anyhow::anyhow!(detail)),
            ClientError::TransportTimeout { .. } => AppError::GatewayTimeout(err.to_string()),
            ClientError::NotImplemented { operation } => {
                AppError::NotImplemented(operation.to_string())
            }
            ClientError::Discovery(_)
            | ClientError::UserInfo { .. }
            | ClientError::CatalogRequest { .. }
            | ClientError::CatalogDecode(_)
            | ClientError::ChannelCredentials(_) => AppError::BadGateway(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_token_maps_to_unauthorized() {
        let err = ClientError::UserInfo {
            status: Some(StatusCode::UNAUTHORIZED),
            detail: "invalid_token".to_string(),
        };
        assert!(matches!(AppError::from(err), AppError::Unauthorized(_)));
    }

    #[test]
    fn user_info_server_error_maps_to_bad_gateway() {
        let err = ClientError::UserInfo {
            status: Some(StatusCode::INTERNAL_SERVER_ERROR),
            detail: "boom".to_string(),
        };
        assert!(matches!(AppError::from(err), AppError::BadGateway(_)));
    }

    #[test]
    fn catalog_failures_map_to_bad_gateway() {
        let request = ClientError::CatalogRequest {
            status: Some(StatusCode::NOT_FOUND),
            detail: "404 Not Found".to_string(),
        };
        let decode = ClientError::CatalogDecode(
            serde_json::from_str::<Vec<u8>>("{").unwrap_err(),
        );

        assert!(matches!(AppError::from(request), AppError::BadGateway(_)));
        assert!(matches!(AppError::from(decode), AppError::BadGateway(_)));
    }

    #[test]
    fn timeout_and_stub_map_to_their_own_statuses() {
        let timeout = ClientError::TransportTimeout {
            operation: "catalog listing",
        };
        let stub = ClientError::NotImplemented {
            operation: "create_movie",
        };

        assert!(matches!(AppError::from(timeout), AppError::GatewayTimeout(_)));
        match AppError::from(stub) {
            AppError::NotImplemented(operation) => assert_eq!(operation, "create_movie"),
            other => panic!("unexpected mapping: {:?}", other),
        }
    }
}
