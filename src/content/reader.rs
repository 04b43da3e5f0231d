use anyhow::{anyhow, bail, Result};
use http::header::CONTENT_TYPE;
use http::Method;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::context::Context;

/// Deserialize the request into `T`.
///
/// GET requests read from the query string; everything else dispatches on
/// the `Content-Type` header and defaults to the URL-encoded form reader
/// when the type is missing or unrecognized.
pub(crate) fn read<T: DeserializeOwned>(ctx: &Context<'_>) -> Result<T> {
    if ctx.request.method() == Method::GET {
        let query = ctx.request.uri().query().unwrap_or("");
        return read_pairs(query.as_bytes());
    }

    let content_type = ctx
        .request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let mime = content_type.split(';').next().unwrap_or("").trim();
    let body = ctx.request.body();

    match mime {
        "application/json" => Ok(serde_json::from_slice(body)?),
        "application/xml" | "text/xml" => {
            let text = std::str::from_utf8(body)?;
            quick_xml::de::from_str(text).map_err(|err| anyhow!("xml body: {err}"))
        }
        m if m.starts_with("multipart/") => read_multipart(body, content_type),
        _ => read_pairs(body),
    }
}

/// Decode URL-encoded pairs into `T` via an intermediate JSON value.
///
/// Dotted field names nest (`profile.name=x`), repeated names collect into
/// arrays. Values are tried verbatim first so string-typed fields keep
/// their exact text; when that shape is rejected, scalars are re-inferred
/// as i64 / f64 / bool for numeric and boolean targets.
fn read_pairs<T: DeserializeOwned>(raw: &[u8]) -> Result<T> {
    let fields: Vec<(String, String)> = url::form_urlencoded::parse(raw)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    read_fields(&fields)
}

fn read_fields<T: DeserializeOwned>(fields: &[(String, String)]) -> Result<T> {
    let verbatim = fields_to_value(fields, false);
    match serde_json::from_value(verbatim) {
        Ok(target) => Ok(target),
        Err(first_err) => {
            let inferred = fields_to_value(fields, true);
            serde_json::from_value(inferred).map_err(|_| first_err.into())
        }
    }
}

fn fields_to_value(fields: &[(String, String)], infer: bool) -> Value {
    let mut root = Map::new();
    for (name, value) in fields {
        let scalar = if infer {
            infer_scalar(value)
        } else {
            Value::String(value.clone())
        };
        insert_field(&mut root, name, scalar);
    }
    Value::Object(root)
}

/// Place `value` at the dotted path `name`, collecting repeats into arrays.
fn insert_field(root: &mut Map<String, Value>, name: &str, value: Value) {
    let mut map = root;
    let mut parts = name.split('.').peekable();
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            match map.get_mut(part) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(part.to_string(), value);
                }
            }
            return;
        }
        let entry = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        map = match entry.as_object_mut() {
            Some(map) => map,
            None => return,
        };
    }
}

/// Best-effort scalar typing for form values, the same way path and query
/// parameters are coerced before reaching handlers.
fn infer_scalar(value: &str) -> Value {
    if value == "true" || value == "false" {
        return Value::Bool(value == "true");
    }
    // A leading zero means "this is really text" (zip codes, ids).
    let numeric_shape = !value.is_empty()
        && !(value.len() > 1 && value.starts_with('0'))
        && !(value.len() > 2 && value.starts_with("-0"));
    if numeric_shape {
        if let Ok(n) = value.parse::<i64>() {
            return Value::Number(n.into());
        }
        if let Ok(f) = value.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    }
    Value::String(value.to_string())
}

/// Extract the text fields of a `multipart/form-data` body and decode them
/// like a URL-encoded form. File parts are skipped.
fn read_multipart<T: DeserializeOwned>(body: &[u8], content_type: &str) -> Result<T> {
    let boundary = parse_boundary(content_type)
        .ok_or_else(|| anyhow!("multipart body without boundary parameter"))?;
    let text = std::str::from_utf8(body)?;
    let delimiter = format!("--{boundary}");
    let positions = boundary_positions(text, &delimiter);
    if positions.is_empty() {
        bail!("malformed multipart body");
    }

    let mut fields: Vec<(String, String)> = Vec::new();
    for (i, &pos) in positions.iter().enumerate() {
        let start = pos + delimiter.len();
        if text[start..].starts_with("--") {
            break;
        }
        let end = positions.get(i + 1).copied().unwrap_or(text.len());
        let part = &text[start..end];
        let part = part.strip_prefix("\r\n").unwrap_or(part);
        let Some((raw_headers, content)) = part.split_once("\r\n\r\n") else {
            continue;
        };
        let mut name: Option<String> = None;
        let mut is_file = false;
        for line in raw_headers.split("\r\n") {
            let Some((header, rest)) = line.split_once(':') else {
                continue;
            };
            if !header.eq_ignore_ascii_case("content-disposition") {
                continue;
            }
            for attr in rest.split(';') {
                let attr = attr.trim();
                if let Some(v) = attr.strip_prefix("name=") {
                    name = Some(v.trim_matches('"').to_string());
                } else if attr.starts_with("filename=") {
                    is_file = true;
                }
            }
        }
        let content = content.strip_suffix("\r\n").unwrap_or(content);
        if let Some(name) = name {
            if !is_file {
                fields.push((name, content.to_string()));
            }
        }
    }
    read_fields(&fields)
}

/// Offsets of the real part delimiters: at the very start of the body or
/// right after a CRLF (RFC 2046). Delimiter-looking text inside a field
/// value has neither and stays part of the content.
fn boundary_positions(text: &str, delimiter: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut from = 0;
    while let Some(found) = text[from..].find(delimiter) {
        let idx = from + found;
        if idx == 0 || text[..idx].ends_with("\r\n") {
            positions.push(idx);
        }
        from = idx + delimiter.len();
    }
    positions
}

fn parse_boundary(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        param
            .trim()
            .strip_prefix("boundary=")
            .map(|b| b.trim_matches('"').to_string())
    })
}
