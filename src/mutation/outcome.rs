use serde::Deserialize;
use serde_json::Value;

use crate::error_catalog::ErrorCatalog;
use crate::mutation::error::MutationError;

/// Shown when a failure cannot be mapped to anything more specific.
pub const GENERIC_ERROR_MESSAGE: &str = "We could not process your request.";

/// Shown when the server answers a write with HTTP 403.
pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform this action.";

/// One business-rule rejection reported in-band by the server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainError {
    /// Top-level payload key the error was reported under.
    pub result_key: String,
    pub resource: String,
    pub field: String,
    pub code: String,
}

#[derive(Deserialize)]
struct WireDomainError {
    #[serde(default)]
    resource: Option<String>,
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Result of scanning a settled payload for domain errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    Success,
    DomainError {
        /// First error of the first erroring key; the one shown to the user.
        primary: DomainError,
        /// Every domain error in payload order, `primary` included.
        all: Vec<DomainError>,
    },
}

impl Classification {
    pub fn is_success(&self) -> bool {
        matches!(self, Classification::Success)
    }
}

/// Scans top-level payload keys in server order for non-empty `errors` arrays.
pub fn classify(payload: &Value) -> Classification {
    let Some(fields) = payload.as_object() else {
        return Classification::Success;
    };

    let all: Vec<DomainError> = fields
        .iter()
        .flat_map(|(key, value)| domain_errors_for(key, value))
        .collect();

    match all.first().cloned() {
        Some(primary) => Classification::DomainError { primary, all },
        None => Classification::Success,
    }
}

fn domain_errors_for(key: &str, value: &Value) -> Vec<DomainError> {
    let Some(errors) = value
        .as_object()
        .and_then(|object| object.get("errors"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    errors
        .iter()
        .map(|entry| {
            let wire = WireDomainError::deserialize(entry).unwrap_or(WireDomainError {
                resource: None,
                field: None,
                code: None,
            });
            DomainError {
                result_key: key.to_string(),
                resource: wire.resource.unwrap_or_default(),
                field: wire.field.unwrap_or_default(),
                code: wire.code.unwrap_or_default(),
            }
        })
        .collect()
}

/// Message for a domain error; falls back to [`GENERIC_ERROR_MESSAGE`] when the
/// catalog is unavailable or does not map the triple.
pub fn domain_error_message(catalog: Option<&ErrorCatalog>, error: &DomainError) -> String {
    catalog
        .and_then(|catalog| catalog.lookup(&error.resource, &error.field, &error.code))
        .unwrap_or(GENERIC_ERROR_MESSAGE)
        .to_string()
}

/// Message for a rejected write.
pub fn transport_error_message(error: &MutationError) -> &'static str {
    if error.is_permission_denied() {
        PERMISSION_DENIED_MESSAGE
    } else {
        GENERIC_ERROR_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::error::{internal_error, network_error, permission_denied};
    use serde_json::json;

    #[test]
    fn null_or_empty_errors_is_success() {
        assert!(classify(&json!({ "updateThing": { "ok": true, "errors": null } })).is_success());
        assert!(classify(&json!({ "updateThing": { "ok": true, "errors": [] } })).is_success());
        assert!(classify(&json!({ "updateThing": { "ok": true } })).is_success());
        assert!(classify(&json!({ "deleteThing": true })).is_success());
        assert!(classify(&Value::Null).is_success());
    }

    #[test]
    fn first_error_of_first_erroring_key_is_primary() {
        let payload = json!({
            "updateThing": { "ok": true, "errors": null },
            "renameThing": {
                "errors": [
                    { "resource": "Thing", "field": "name", "code": "required" },
                    { "resource": "Thing", "field": "slug", "code": "taken" }
                ]
            },
            "tagThing": {
                "errors": [{ "resource": "Tag", "field": "label", "code": "invalid" }]
            }
        });

        let Classification::DomainError { primary, all } = classify(&payload) else {
            panic!("expected a domain error");
        };
        assert_eq!(primary.result_key, "renameThing");
        assert_eq!(primary.field, "name");
        assert_eq!(primary.code, "required");
        let keys: Vec<_> = all.iter().map(|err| (err.result_key.as_str(), err.code.as_str())).collect();
        assert_eq!(
            keys,
            [("renameThing", "required"), ("renameThing", "taken"), ("tagThing", "invalid")]
        );
    }

    #[test]
    fn key_order_follows_the_payload_not_the_alphabet() {
        let payload: Value = serde_json::from_str(
            r#"{"zeta": {"errors": [{"resource": "Z", "field": "f", "code": "c"}]},
                "alpha": {"errors": [{"resource": "A", "field": "f", "code": "c"}]}}"#,
        )
        .unwrap();

        let Classification::DomainError { primary, .. } = classify(&payload) else {
            panic!("expected a domain error");
        };
        assert_eq!(primary.resource, "Z");
    }

    #[test]
    fn malformed_entries_still_disqualify_success() {
        let payload = json!({ "updateThing": { "errors": ["boom"] } });
        let Classification::DomainError { primary, .. } = classify(&payload) else {
            panic!("expected a domain error");
        };
        assert_eq!(primary.resource, "");
        assert_eq!(
            domain_error_message(Some(&ErrorCatalog::default()), &primary),
            GENERIC_ERROR_MESSAGE
        );
    }

    #[test]
    fn catalog_messages_resolve_exactly() {
        let catalog = ErrorCatalog::from_entries([("Thing", "name", "required", "Name is required.")]);
        let error = DomainError {
            result_key: "updateThing".into(),
            resource: "Thing".into(),
            field: "name".into(),
            code: "required".into(),
        };
        assert_eq!(domain_error_message(Some(&catalog), &error), "Name is required.");
        assert_eq!(domain_error_message(None, &error), GENERIC_ERROR_MESSAGE);

        let unmapped = DomainError {
            code: "too_long".into(),
            ..error
        };
        assert_eq!(domain_error_message(Some(&catalog), &unmapped), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn transport_messages() {
        assert_eq!(transport_error_message(&permission_denied("no")), PERMISSION_DENIED_MESSAGE);
        assert_eq!(
            transport_error_message(&network_error("down").with_status(502)),
            GENERIC_ERROR_MESSAGE
        );
        assert_eq!(transport_error_message(&internal_error("odd")), GENERIC_ERROR_MESSAGE);
    }
}
