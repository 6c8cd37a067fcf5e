use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle of a remote prediction job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Succeeded | Status::Failed | Status::Canceled)
    }
}

/// A remote prediction resource, as returned by the service.
///
/// `input`/`output`/`error` are kept as raw JSON: their shape is defined by
/// the model, not by this client. Object key order is preserved so
/// [`Prediction::output_files`] walks nested outputs in document order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Service-provided URLs keyed by purpose (`stream`, `get`, `cancel`).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub urls: HashMap<String, String>,
}

impl Prediction {
    /// The SSE endpoint for this prediction, when the service offers one.
    pub fn stream_url(&self) -> Option<&str> {
        self.urls.get("stream").map(String::as_str)
    }

    /// File references (data URIs and http(s) URLs) found anywhere in the
    /// completed output, in document order.
    pub fn output_files(&self) -> Vec<String> {
        self.output
            .as_ref()
            .map(sibyl_stream::file_candidates)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use serde_json::json;

    use super::*;

    fn prediction(value: Value) -> Prediction {
        serde_json::from_value(value).unwrap()
    }

    #[rstest]
    #[case::starting("starting", false)]
    #[case::processing("processing", false)]
    #[case::succeeded("succeeded", true)]
    #[case::failed("failed", true)]
    #[case::canceled("canceled", true)]
    fn status_parses_and_knows_terminality(#[case] wire: &str, #[case] terminal: bool) {
        let status: Status = serde_json::from_value(json!(wire)).unwrap();
        assert_eq!(status.is_terminal(), terminal);
    }

    #[rstest]
    fn stream_url_reads_the_urls_map() {
        let p = prediction(json!({
            "id": "p1",
            "status": "processing",
            "urls": {"stream": "https://stream.example/p1", "get": "https://api.example/p1"},
        }));
        assert_eq!(p.stream_url(), Some("https://stream.example/p1"));
    }

    #[rstest]
    fn stream_url_absent_when_not_offered() {
        let p = prediction(json!({"id": "p1", "status": "starting"}));
        assert_eq!(p.stream_url(), None);
    }

    #[rstest]
    fn output_files_walks_nested_output() {
        let p = prediction(json!({
            "id": "p1",
            "status": "succeeded",
            "output": {
                "images": ["https://files.example/a.png", "plain caption"],
                "thumb": "data:image/png;base64,AAAA",
            },
        }));
        assert_eq!(
            p.output_files(),
            vec!["https://files.example/a.png", "data:image/png;base64,AAAA"]
        );
    }
}
