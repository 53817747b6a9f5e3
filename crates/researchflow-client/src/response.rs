//! Turning HTTP responses into values or typed errors

use researchflow_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Keys that carry a human-readable failure in an error body
const MESSAGE_KEYS: [&str; 3] = ["error", "message", "detail"];

pub(crate) fn transport(err: reqwest::Error) -> Error {
    Error::Transport(err.to_string())
}

/// Read the body, mapping non-2xx statuses to `Error::Http`
pub(crate) async fn read_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await.map_err(transport)?;
    if !status.is_success() {
        let message = error_message(&body);
        tracing::debug!(status = status.as_u16(), %message, "request rejected");
        return Err(Error::Http {
            status: status.as_u16(),
            message,
        });
    }
    Ok(body)
}

/// Decode a successful JSON body, rejecting bodies that carry an `error`
pub(crate) async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = read_body(response).await?;
    decode(&body)
}

pub(crate) fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: Value = serde_json::from_str(body)
        .map_err(|err| Error::Backend(format!("unexpected response from server: {err}")))?;
    if let Some(message) = embedded_error(&value) {
        return Err(Error::Backend(message));
    }
    serde_json::from_value(value)
        .map_err(|err| Error::Backend(format!("unexpected response from server: {err}")))
}

fn embedded_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Best human-readable message in an error body.
///
/// Prefers `error`/`message`/`detail`, then field errors such as
/// `{"username": ["already taken"]}`, then the raw body.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    for key in MESSAGE_KEYS {
        if let Some(Value::String(s)) = map.get(key) {
            return s.clone();
        }
    }
    let fields: Vec<String> = map
        .iter()
        .filter_map(|(field, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => return None,
            };
            (!text.is_empty()).then(|| format!("{field}: {text}"))
        })
        .collect();
    if fields.is_empty() {
        body.trim().to_string()
    } else {
        fields.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Answer {
        response: String,
    }

    #[test]
    fn test_error_message_sources() {
        assert_eq!(error_message(r#"{"error": "Texto vazio."}"#), "Texto vazio.");
        assert_eq!(error_message(r#"{"message": "Database down"}"#), "Database down");
        assert_eq!(
            error_message(r#"{"username": ["A user with that username already exists."]}"#),
            "username: A user with that username already exists."
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
        assert_eq!(error_message(""), "");
    }

    #[test]
    fn test_decode_rejects_embedded_error() {
        let ok: Answer = decode(r#"{"response": "hi"}"#).unwrap();
        assert_eq!(ok.response, "hi");

        let err = decode::<Answer>(r#"{"error": "model unavailable"}"#).unwrap_err();
        assert!(matches!(err, Error::Backend(msg) if msg == "model unavailable"));

        assert!(matches!(decode::<Answer>("<html>"), Err(Error::Backend(_))));
    }
}
