use anyhow::{anyhow, Result};
use http::header::{HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use serde_json::Value;

use crate::response::ResponseWriter;

/// Data a handler hands to [`Context::write`](crate::Context::write).
///
/// Byte slices and strings pass through the default writer untouched; any
/// other value travels as a JSON value and each writer decides how to
/// render it.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Bytes(Vec<u8>),
    Text(String),
    Value(Value),
}

impl Payload {
    /// Convert any serializable value into a [`Payload::Value`].
    pub fn json<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Payload::Value(serde_json::to_value(value)?))
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&[u8]> for Payload {
    fn from(bytes: &[u8]) -> Self {
        Payload::Bytes(bytes.to_vec())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Value(value)
    }
}

/// The response data encoder installed on a context.
///
/// The default variant writes bytes and strings as-is and falls back to the
/// compact JSON text for structured values. The JSON/XML/HTML variants set
/// the matching `Content-Type` header when installed and serialize
/// accordingly. Raw bytes always bypass serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataWriter {
    #[default]
    Default,
    Json,
    Xml,
    Html,
}

impl DataWriter {
    /// Apply this writer's `Content-Type` header, if it has an opinion.
    pub fn set_header(&self, res: &mut dyn ResponseWriter) {
        let value = match self {
            DataWriter::Default => return,
            DataWriter::Json => "application/json",
            DataWriter::Xml => "application/xml; charset=UTF-8",
            DataWriter::Html => "text/html; charset=UTF-8",
        };
        res.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(value));
    }

    /// Render `payload` into the response body.
    pub fn write(&self, res: &mut dyn ResponseWriter, payload: Payload) -> Result<()> {
        match self {
            DataWriter::Default | DataWriter::Html => match payload {
                Payload::Bytes(bytes) => {
                    res.write(&bytes)?;
                }
                Payload::Text(text) => {
                    res.write(text.as_bytes())?;
                }
                Payload::Value(Value::String(text)) => {
                    res.write(text.as_bytes())?;
                }
                Payload::Value(Value::Null) => {}
                Payload::Value(value) => {
                    res.write(value.to_string().as_bytes())?;
                }
            },
            DataWriter::Json => match payload {
                Payload::Bytes(bytes) => {
                    res.write(&bytes)?;
                }
                Payload::Text(text) => {
                    res.write(&serde_json::to_vec(&Value::String(text))?)?;
                }
                Payload::Value(value) => {
                    res.write(&serde_json::to_vec(&value)?)?;
                }
            },
            DataWriter::Xml => match payload {
                Payload::Bytes(bytes) => {
                    res.write(&bytes)?;
                }
                Payload::Text(text) => {
                    res.write(text.as_bytes())?;
                }
                Payload::Value(value) => {
                    let xml = quick_xml::se::to_string_with_root("response", &value)
                        .map_err(|err| anyhow!("xml serialization failed: {err}"))?;
                    res.write(xml.as_bytes())?;
                }
            },
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::BufferedResponse;

    #[test]
    fn test_default_writer_passes_text_through() {
        let mut res = BufferedResponse::new();
        let w = DataWriter::Default;
        w.write(&mut res, Payload::from("hello")).unwrap();
        w.write(&mut res, Payload::from(&b", world"[..])).unwrap();
        assert_eq!(res.body(), b"hello, world");
        assert!(res.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_default_writer_formats_values() {
        let mut res = BufferedResponse::new();
        DataWriter::Default
            .write(&mut res, Payload::from(serde_json::json!({"n": 5})))
            .unwrap();
        assert_eq!(res.body(), br#"{"n":5}"#);
    }

    #[test]
    fn test_json_writer_sets_header_and_serializes() {
        let mut res = BufferedResponse::new();
        let w = DataWriter::Json;
        w.set_header(&mut res);
        w.write(&mut res, Payload::from(serde_json::json!({"ok": true})))
            .unwrap();
        assert_eq!(
            res.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(res.body(), br#"{"ok":true}"#);
    }

    #[test]
    fn test_json_writer_quotes_text() {
        let mut res = BufferedResponse::new();
        DataWriter::Json
            .write(&mut res, Payload::from("hi"))
            .unwrap();
        assert_eq!(res.body(), br#""hi""#);
    }

    #[test]
    fn test_html_writer_header() {
        let mut res = BufferedResponse::new();
        let w = DataWriter::Html;
        w.set_header(&mut res);
        w.write(&mut res, Payload::from("<p>hi</p>")).unwrap();
        assert_eq!(
            res.headers().get(CONTENT_TYPE).unwrap(),
            "text/html; charset=UTF-8"
        );
        assert_eq!(res.body(), b"<p>hi</p>");
    }

    #[test]
    fn test_xml_writer_wraps_value() {
        let mut res = BufferedResponse::new();
        let w = DataWriter::Xml;
        w.set_header(&mut res);
        w.write(&mut res, Payload::from(serde_json::json!({"name": "jan"})))
            .unwrap();
        assert_eq!(
            res.headers().get(CONTENT_TYPE).unwrap(),
            "application/xml; charset=UTF-8"
        );
        let body = std::str::from_utf8(res.body()).unwrap();
        assert!(body.contains("<name>jan</name>"), "body was {body:?}");
    }
}
