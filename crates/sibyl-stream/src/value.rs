use serde_json::Value;

/// How an output string should be treated when interpreted as a file
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSourceKind {
    /// An RFC 2397 `data:` URI carrying the bytes inline.
    DataUri,
    /// An `http://` or `https://` URL to fetch.
    Url,
    /// Plain text with no file semantics.
    Plain,
}

pub fn classify(s: &str) -> FileSourceKind {
    if s.starts_with("data:") {
        FileSourceKind::DataUri
    } else if s.starts_with("http://") || s.starts_with("https://") {
        FileSourceKind::Url
    } else {
        FileSourceKind::Plain
    }
}

/// Collect every string in a JSON value that looks like a file reference,
/// in document order. Object keys keep their insertion order, so nested
/// outputs yield their files in the order the service produced them.
pub fn file_candidates(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    walk(value, &mut out);
    out
}

fn walk(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            if classify(s) != FileSourceKind::Plain {
                out.push(s.clone());
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, out);
            }
        }
        Value::Object(map) => {
            for item in map.values() {
                walk(item, out);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case("data:text/plain;base64,aGk=", FileSourceKind::DataUri)]
    #[case("https://example.com/out.png", FileSourceKind::Url)]
    #[case("http://example.com/out.png", FileSourceKind::Url)]
    #[case("httpx://example.com", FileSourceKind::Plain)]
    #[case("hello world", FileSourceKind::Plain)]
    #[case("", FileSourceKind::Plain)]
    fn classifies_strings(#[case] s: &str, #[case] expected: FileSourceKind) {
        assert_eq!(classify(s), expected);
    }

    #[rstest]
    fn collects_nested_candidates_in_order() {
        let value = json!({
            "first": "https://example.com/a.png",
            "nested": {
                "items": ["plain text", "data:,inline", 42, null],
            },
            "last": ["https://example.com/b.png"],
        });

        assert_eq!(
            file_candidates(&value),
            vec![
                "https://example.com/a.png",
                "data:,inline",
                "https://example.com/b.png",
            ]
        );
    }

    #[rstest]
    fn scalar_values_yield_nothing() {
        assert!(file_candidates(&json!(42)).is_empty());
        assert!(file_candidates(&json!("plain")).is_empty());
    }
}
