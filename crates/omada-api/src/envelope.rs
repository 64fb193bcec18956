// Response envelope decoding
//
// Every controller endpoint wraps its payload as
// `{ "errorCode": 0, "msg": "...", "result": ... }`. The decoder is a pure
// function of the body: it never performs I/O and knows nothing about the
// shape of `result` beyond "present or absent".

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Error;

const ERROR_CODE: &str = "errorCode";
const MESSAGE: &str = "msg";
const RESULT: &str = "result";

/// Longest body excerpt carried inside an error.
const BODY_PREVIEW: usize = 200;

/// Parse a raw response body and unwrap its envelope.
///
/// A body that isn't JSON at all yields [`Error::NotJson`]; everything
/// else is handed to [`decode`].
pub fn decode_body(url: &str, body: &str) -> Result<Value, Error> {
    let json: Value = serde_json::from_str(body).map_err(|_| Error::NotJson {
        url: url.to_owned(),
        body: preview(body),
    })?;
    decode(url, json)
}

/// Unwrap an already-parsed envelope.
///
/// - no (integer) `errorCode` → [`Error::MalformedResponse`]
/// - `errorCode != 0` → [`Error::Omada`] with the code and optional `msg`
/// - `errorCode == 0` → `result`, or an empty object when it is absent
pub fn decode(url: &str, body: Value) -> Result<Value, Error> {
    let Value::Object(mut envelope) = body else {
        return Err(Error::MalformedResponse {
            url: url.to_owned(),
        });
    };

    let error_code = envelope
        .get(ERROR_CODE)
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::MalformedResponse {
            url: url.to_owned(),
        })?;

    if error_code != 0 {
        let message = envelope
            .get(MESSAGE)
            .and_then(Value::as_str)
            .map(str::to_owned);
        return Err(Error::Omada {
            error_code,
            message,
        });
    }

    Ok(match envelope.remove(RESULT) {
        Some(result) => result,
        None => Value::Object(Map::new()),
    })
}

/// Unwrap the envelope and deserialize its payload into `T`.
pub fn decode_as<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, Error> {
    let payload = decode_body(url, body)?;
    serde_json::from_value(payload).map_err(|e| Error::Deserialization {
        message: format!("{e} (from {url})"),
        body: preview(body),
    })
}

pub(crate) fn preview(body: &str) -> String {
    match body.char_indices().nth(BODY_PREVIEW) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_owned(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    const URL: &str = "https://omada.local/api/v2/sites/Default/clients";

    #[test]
    fn success_returns_result_verbatim() {
        let result = json!({ "currentPage": 1, "data": [{ "mac": "AA-BB-CC-DD-EE-FF" }] });
        let payload = decode(URL, json!({ "errorCode": 0, "result": result.clone() })).unwrap();
        assert_eq!(payload, result);
    }

    #[test]
    fn success_without_result_is_empty_object() {
        let payload = decode(URL, json!({ "errorCode": 0, "msg": "Success." })).unwrap();
        assert_eq!(payload, json!({}));
    }

    #[test]
    fn success_with_list_result() {
        let payload = decode(URL, json!({ "errorCode": 0, "result": [1, 2, 3] })).unwrap();
        assert_eq!(payload, json!([1, 2, 3]));
    }

    #[test]
    fn nonzero_code_carries_code_and_message() {
        let err = decode(
            URL,
            json!({ "errorCode": -30109, "msg": "Invalid username or password." }),
        )
        .unwrap_err();

        match err {
            Error::Omada {
                error_code,
                message,
            } => {
                assert_eq!(error_code, -30109);
                assert_eq!(message.as_deref(), Some("Invalid username or password."));
            }
            other => panic!("expected Omada error, got: {other:?}"),
        }
    }

    #[test]
    fn nonzero_code_without_message() {
        let err = decode(URL, json!({ "errorCode": -1, "result": {} })).unwrap_err();
        assert!(
            matches!(
                err,
                Error::Omada {
                    error_code: -1,
                    message: None
                }
            ),
            "got: {err:?}"
        );
    }

    #[test]
    fn missing_error_code_is_malformed_whatever_else_is_present() {
        for body in [
            json!({}),
            json!({ "result": { "login": true } }),
            json!({ "msg": "Success.", "result": [] }),
            json!({ "errorcode": 0 }),
            json!({ "errorCode": "0" }),
            json!([{ "errorCode": 0 }]),
        ] {
            let err = decode(URL, body.clone()).unwrap_err();
            assert!(
                matches!(err, Error::MalformedResponse { ref url } if url == URL),
                "body {body} gave {err:?}"
            );
        }
    }

    #[test]
    fn html_body_is_not_json() {
        let err = decode_body(URL, "<!DOCTYPE html><html><body>login</body></html>").unwrap_err();
        assert!(err.is_not_json(), "got: {err:?}");
    }

    #[test]
    fn decode_body_parses_then_unwraps() {
        let payload = decode_body(URL, r#"{"errorCode":0,"result":{"login":true}}"#).unwrap();
        assert_eq!(payload, json!({ "login": true }));
    }

    #[test]
    fn decode_as_reports_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        struct Status {
            login: bool,
        }

        let status: Status = decode_as(URL, r#"{"errorCode":0,"result":{"login":true}}"#).unwrap();
        assert!(status.login);

        let err = decode_as::<Status>(URL, r#"{"errorCode":0}"#).unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
    }

    #[test]
    fn preview_truncates_long_bodies() {
        let long = "x".repeat(500);
        let p = preview(&long);
        assert_eq!(p.len(), BODY_PREVIEW + 3);
        assert_eq!(preview("short"), "short");
    }
}
