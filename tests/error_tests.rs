//! Error handling module tests

use ollama_usage_client::utils::error::*;
use reqwest::StatusCode;

fn status_error(code: u16) -> ClientError {
    ClientError::Status {
        status: StatusCode::from_u16(code).unwrap(),
        body: "error body".to_string(),
    }
}

#[test]
fn test_transient_classification() {
    for code in [429, 500, 502, 503, 504] {
        assert!(status_error(code).is_transient(), "{} should be transient", code);
    }
    for code in [400, 401, 404, 422, 501] {
        assert!(!status_error(code).is_transient(), "{} should not be transient", code);
    }

    assert!(!ClientError::Validation("x".to_string()).is_transient());
}

#[test]
fn test_error_types() {
    let test_cases = vec![
        (ClientError::Config(anyhow::anyhow!("test")), "config_error"),
        (ClientError::Validation("test".to_string()), "invalid_request_error"),
        (status_error(404), "api_error"),
        (
            ClientError::RetriesExhausted {
                attempts: 4,
                last: Box::new(status_error(503)),
            },
            "retries_exhausted_error",
        ),
    ];

    for (error, expected_type) in test_cases {
        assert_eq!(error.error_type(), expected_type);
    }

    let serde_err = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
    assert_eq!(ClientError::from(serde_err).error_type(), "serialization_error");
    assert_eq!(
        ClientError::InvalidResponse("not an object".to_string()).error_type(),
        "invalid_response_error"
    );
}

#[test]
fn test_error_messages_include_cause() {
    let err = status_error(404);
    assert_eq!(err.to_string(), "Service returned 404 Not Found: error body");

    let err = ClientError::RetriesExhausted {
        attempts: 4,
        last: Box::new(status_error(503)),
    };
    assert_eq!(
        err.to_string(),
        "Max retries exceeded after 4 attempts: Service returned 503 Service Unavailable: error body"
    );
}

#[test]
fn test_status_code() {
    assert_eq!(status_error(502).status_code(), Some(StatusCode::BAD_GATEWAY));
    assert_eq!(ClientError::Validation("x".to_string()).status_code(), None);
}
