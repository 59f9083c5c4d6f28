use super::error::ClientError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A response body, decoded according to its `Content-Type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Decodes `bytes`. Returns `None` for an empty body.
    pub fn parse(content_type: Option<&str>, bytes: &[u8]) -> Result<Option<Self>, ClientError> {
        if bytes.is_empty() {
            return Ok(None);
        }
        let is_json = content_type
            .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
            .unwrap_or(false);

        if is_json {
            Ok(Some(ResponseBody::Json(serde_json::from_slice(bytes)?)))
        } else {
            Ok(Some(ResponseBody::Text(
                String::from_utf8_lossy(bytes).into_owned(),
            )))
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            ResponseBody::Json(value) => value.clone(),
            ResponseBody::Text(text) => Value::String(text.clone()),
        }
    }

    /// Deserializes the body into `T`. Text bodies are parsed as JSON.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        match self {
            ResponseBody::Json(value) => Ok(serde_json::from_value(value)?),
            ResponseBody::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_content_type_is_parsed() {
        let body = ResponseBody::parse(Some("application/json; charset=utf-8"), br#"{"total":0}"#)
            .unwrap();
        assert_eq!(body, Some(ResponseBody::Json(json!({"total": 0}))));
    }

    #[test]
    fn test_other_content_types_are_text() {
        let body = ResponseBody::parse(Some("text/html"), b"<p>hi</p>").unwrap();
        assert_eq!(body, Some(ResponseBody::Text("<p>hi</p>".to_string())));

        let body = ResponseBody::parse(None, br#"{"looks":"like json"}"#).unwrap();
        assert!(matches!(body, Some(ResponseBody::Text(_))));
    }

    #[test]
    fn test_empty_body_is_none() {
        assert_eq!(ResponseBody::parse(Some("application/json"), b"").unwrap(), None);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result = ResponseBody::parse(Some("application/json"), b"{not json");
        assert!(matches!(result, Err(ClientError::Serialization(_))));
    }

    #[test]
    fn test_into_json_deserializes_typed_values() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Page {
            total: u32,
        }
        let page: Page = ResponseBody::Json(json!({"total": 3})).into_json().unwrap();
        assert_eq!(page, Page { total: 3 });
    }
}
