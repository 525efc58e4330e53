//! Integration tests for boundary validation
//!
//! Tests cover:
//! - Chain-ID allow-list checks (fail fast, ordered output)
//! - JSON-path extraction from RPC-style responses

use serde::Deserialize;
use transfer_verifier_sdk::{
    chains::{is_supported, supported_chains},
    json_path::{extract_from_json_path, JsonPathError},
    validate_chains, ChainId, ChainValidationError,
};

#[test]
fn test_empty_chain_list() {
    let err = validate_chains(&[]).unwrap_err();
    assert_eq!(err.to_string(), "no chain IDs provided for transfer verification");
}

/// Fails at the first bad identifier and returns no partial list
#[test]
fn test_fail_fast_on_first_bad_id() {
    // 1 (Solana) is known but has no verifier, so the scan stops there
    let err = validate_chains(&[1, 2, 99_999_999]).unwrap_err();
    assert_eq!(err, ChainValidationError::Unsupported(ChainId::SOLANA));

    // With supported ids first, the out-of-namespace id is the one reported
    let err = validate_chains(&[2, 10002, 99_999_999]).unwrap_err();
    assert_eq!(err, ChainValidationError::OutOfRange(99_999_999));

    let err = validate_chains(&[2, 65_000, 10002]).unwrap_err();
    assert_eq!(err, ChainValidationError::UnknownChain(65_000));
}

#[test]
fn test_all_supported_chains_validate() {
    let raw: Vec<u64> = supported_chains().iter().map(|c| c.0 as u64).collect();
    let validated = validate_chains(&raw).unwrap();
    assert_eq!(validated, supported_chains());
    assert!(validated.iter().all(|c| is_supported(*c) && c.is_known()));
}

#[derive(Debug, Deserialize, PartialEq)]
struct Status {
    status: String,
}

#[test]
fn test_extract_typed_fields_from_rpc_response() {
    let response = br#"{
        "jsonrpc": "2.0",
        "result": {
            "digest": "9XFnaLh7d",
            "effects": { "status": { "status": "success" } },
            "timestampMs": "1718000000000"
        }
    }"#;

    let status: Status = extract_from_json_path(response, "result.effects.status").unwrap();
    assert_eq!(status.status, "success");

    let digest: String = extract_from_json_path(response, "result.digest").unwrap();
    assert_eq!(digest, "9XFnaLh7d");

    let err = extract_from_json_path::<u64>(response, "result.timestampMs").unwrap_err();
    assert!(matches!(err, JsonPathError::TypeMismatch { .. }));

    let err = extract_from_json_path::<String>(response, "result.events.0").unwrap_err();
    assert!(matches!(err, JsonPathError::NotFound { ref segment } if segment == "events"));
}
