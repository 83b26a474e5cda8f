use aisle_core::errors::*;

#[test]
fn max_depth_error_carries_values() {
    let err = SessionError::MaxDepthExceeded {
        max_depth: 50,
        requested: 51,
    };
    let msg = err.to_string();
    assert!(msg.contains("50"));
    assert!(msg.contains("51"));
}

#[test]
fn source_failure_carries_source_name() {
    let err = RetrievalError::SourceFailed {
        source_name: "vector".into(),
        reason: "index offline".into(),
    };
    let msg = err.to_string();
    assert!(msg.contains("vector"));
    assert!(msg.contains("index offline"));
}

#[test]
fn circuit_open_is_not_an_attempt() {
    let open = AiError::CircuitOpen {
        operation: "rerank".into(),
    };
    let timeout = AiError::Timeout {
        operation: "rerank".into(),
        timeout_ms: 4000,
    };
    assert!(!open.was_attempted());
    assert!(timeout.was_attempted());
    assert!(timeout.to_string().contains("4000"));
}

// --- From impls ---

#[test]
fn retrieval_error_converts_to_aisle_error() {
    let err: AisleError = RetrievalError::AllSourcesFailed { reasons: vec![] }.into();
    assert!(matches!(err, AisleError::RetrievalError(_)));
}

#[test]
fn session_error_converts_to_aisle_error() {
    let err: AisleError = SessionError::Expired {
        session_id: "s1".into(),
    }
    .into();
    assert!(matches!(err, AisleError::SessionError(_)));
}

#[test]
fn serde_error_converts_to_aisle_error() {
    let serde_err = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
    let err: AisleError = serde_err.into();
    assert!(matches!(err, AisleError::SerializationError(_)));
}

// --- user visibility ---

#[test]
fn pagination_restart_errors_are_user_visible() {
    let expired: AisleError = SessionError::Expired {
        session_id: "s1".into(),
    }
    .into();
    let depth: AisleError = SessionError::MaxDepthExceeded {
        max_depth: 50,
        requested: 51,
    }
    .into();
    assert!(expired.is_user_visible());
    assert!(depth.is_user_visible());
}

#[test]
fn server_side_errors_are_not_user_visible() {
    let conflict: AisleError = SessionError::Conflict {
        session_id: "s1".into(),
        attempts: 5,
    }
    .into();
    let total: AisleError = RetrievalError::AllSourcesFailed {
        reasons: vec!["text down".into()],
    }
    .into();
    assert!(!conflict.is_user_visible());
    assert!(!total.is_user_visible());
}
