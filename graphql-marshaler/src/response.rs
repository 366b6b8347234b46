use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::error::ClientError;

/// The error location
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// The line number
    pub line: u32,
    /// The column number
    pub column: u32,
}

/// A [GraphQL error](https://spec.graphql.org/October2021/#sec-Errors)
/// as found in the `errors` field of a response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphQLError {
    /// The error message.
    pub message: String,

    /// The locations of the error in the query document.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,

    /// If this is a field error, the JSON path to that field in `data`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,

    /// The optional GraphQL extensions for this error.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub extensions: Map<String, Value>,
}

/// What a [`Transport`](crate::Transport) got back from the API.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// The raw response body.
    pub payload: Bytes,
}

impl Response {
    /// A successful response carrying `payload`, with no headers.
    pub fn from_payload(payload: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            payload: payload.into(),
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLError>>,
}

/// Decodes a GraphQL response payload into `target`.
///
/// Reported errors win over data: if `errors` is not empty the first message is
/// returned as a [`ClientError::RemoteOperation`] and `target` is left untouched.
/// A null or missing `data` also leaves `target` untouched.
///
/// `data` is merged over the current value of `target`, so members the query did
/// not select, such as omitted fields, keep their value.
pub(crate) fn decode_into<T: Serialize + DeserializeOwned>(
    payload: &[u8],
    target: &mut T,
) -> Result<(), ClientError> {
    let envelope: Envelope =
        serde_json::from_slice(payload).map_err(|err| ClientError::MalformedResponse {
            reason: err.to_string(),
        })?;

    let errors = envelope.errors.unwrap_or_default();
    if let Some(first) = errors.first() {
        return Err(ClientError::RemoteOperation {
            message: first.message.clone(),
            errors,
        });
    }

    match envelope.data {
        None | Some(Value::Null) => {
            tracing::warn!("response carried no data");
            Ok(())
        }
        Some(data) => {
            let mut merged =
                serde_json::to_value(&*target).map_err(|err| ClientError::InvalidTarget {
                    reason: err.to_string(),
                })?;
            merge(&mut merged, data);
            *target =
                serde_json::from_value(merged).map_err(|err| ClientError::MalformedResponse {
                    reason: format!("invalid `data`: {err}"),
                })?;
            Ok(())
        }
    }
}

/// Writes `data` over `current`. Objects merge member by member and lists element by
/// element, truncated to the received length. Anything else is replaced.
fn merge(current: &mut Value, data: Value) {
    match (current, data) {
        (Value::Object(current), Value::Object(data)) => {
            for (key, value) in data {
                match current.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        current.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(current), Value::Array(data)) => {
            current.truncate(data.len());
            for (index, value) in data.into_iter().enumerate() {
                match current.get_mut(index) {
                    Some(existing) => merge(existing, value),
                    None => current.push(value),
                }
            }
        }
        (current, data) => *current = data,
    }
}
