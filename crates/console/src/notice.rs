//! User-facing feedback for failed actions.
//!
//! Every gateway failure is converted into notices scoped to the
//! action that triggered it: messages the backend ties to a known
//! field render inline next to that field, everything else falls back
//! to a generic toast. No failure is fatal to the page.

use opsdesk_core::FieldKey;
use opsdesk_gateway::GatewayError;

/// Toast shown when no response was received at all.
pub const CONNECTION_FAILED: &str = "Connection failed. Check your network and try again.";

/// A single piece of user feedback.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice<K: FieldKey> {
    /// An error the backend associated with a known field; rendered
    /// inline on that field's input.
    FieldError { field: K, message: String },
    /// Anything that cannot be tied to a field.
    Toast(String),
}

/// Convert a gateway failure into notices.
///
/// Transport failures become the generic connection toast. Application
/// failures map each message onto a field when the payload names one
/// the entity knows; unmatched messages fall back to toasts. A
/// cancelled call produces nothing -- the view that asked is gone.
pub fn map_gateway_error<K: FieldKey>(error: &GatewayError) -> Vec<Notice<K>> {
    match error {
        GatewayError::Transport(_) => vec![Notice::Toast(CONNECTION_FAILED.to_string())],
        GatewayError::Api { status, errors } => {
            if errors.messages.is_empty() {
                return vec![Notice::Toast(format!("Request failed ({status})"))];
            }
            errors
                .messages
                .iter()
                .map(|msg| {
                    match msg.field.as_deref().and_then(K::from_name) {
                        Some(field) => Notice::FieldError {
                            field,
                            message: msg.message.clone(),
                        },
                        None => Notice::Toast(msg.message.clone()),
                    }
                })
                .collect()
        }
        GatewayError::Cancelled => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdesk_core::UserField;
    use opsdesk_gateway::ApiErrorBody;

    fn api_error(body: &str, status: u16) -> GatewayError {
        GatewayError::Api {
            status,
            errors: ApiErrorBody::parse(body),
        }
    }

    #[test]
    fn known_field_hint_maps_inline() {
        let err = api_error(r#"{"errors": [{"field": "email", "message": "already taken"}]}"#, 422);
        let notices = map_gateway_error::<UserField>(&err);
        assert_eq!(
            notices,
            vec![Notice::FieldError {
                field: UserField::Email,
                message: "already taken".into(),
            }]
        );
    }

    #[test]
    fn unknown_field_hint_falls_back_to_toast() {
        let err = api_error(
            r#"{"errors": [{"field": "wallet_balance", "message": "read only"}]}"#,
            422,
        );
        let notices = map_gateway_error::<UserField>(&err);
        assert_eq!(notices, vec![Notice::Toast("read only".into())]);
    }

    #[test]
    fn bare_message_becomes_toast() {
        let err = api_error(r#"{"message": "Status update rejected"}"#, 409);
        let notices = map_gateway_error::<UserField>(&err);
        assert_eq!(notices, vec![Notice::Toast("Status update rejected".into())]);
    }

    #[test]
    fn empty_error_body_still_produces_feedback() {
        let err = api_error("", 500);
        let notices = map_gateway_error::<UserField>(&err);
        assert_eq!(notices, vec![Notice::Toast("Request failed (500)".into())]);
    }

    #[test]
    fn transport_failure_is_the_generic_toast() {
        // An invalid URL makes reqwest fail at build time, which is the
        // only way to mint a reqwest::Error without a network.
        let inner = reqwest::Client::new().get("no-scheme").build().unwrap_err();
        let notices = map_gateway_error::<UserField>(&GatewayError::Transport(inner));
        assert_eq!(notices, vec![Notice::Toast(CONNECTION_FAILED.into())]);
    }

    #[test]
    fn cancellation_is_silent() {
        let notices = map_gateway_error::<UserField>(&GatewayError::Cancelled);
        assert!(notices.is_empty());
    }
}
