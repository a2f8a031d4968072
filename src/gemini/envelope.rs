//! generateContent 请求体与响应信封

use serde::Serialize;
use serde_json::{value::Index, Value};

use super::ModelError;

/// `{"contents": [{"parts": [{"text": ...}]}]}`
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    pub fn from_prompt(prompt: &'a str) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        }
    }
}

fn step<'v, I: Index>(value: &'v Value, index: I, path: &str) -> Result<&'v Value, ModelError> {
    value
        .get(index)
        .ok_or_else(|| ModelError::Envelope(format!("missing `{path}` in response envelope")))
}

/// 从 200 响应体中取出 `candidates[0].content.parts[0].text`
///
/// 任意一层缺失或类型不符都视为整个调用失败，不做部分结果处理。
pub fn extract_text(body: &str) -> Result<String, ModelError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ModelError::Envelope(format!("response is not valid JSON: {e}")))?;

    let candidates = step(&value, "candidates", "candidates")?;
    let candidate = step(candidates, 0, "candidates[0]")?;
    let content = step(candidate, "content", "candidates[0].content")?;
    let parts = step(content, "parts", "candidates[0].content.parts")?;
    let part = step(parts, 0, "candidates[0].content.parts[0]")?;
    let text = step(part, "text", "candidates[0].content.parts[0].text")?;

    text.as_str().map(str::to_owned).ok_or_else(|| {
        ModelError::Envelope(
            "`candidates[0].content.parts[0].text` is not a string".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::from_prompt("hi")).unwrap();
        assert_eq!(body, json!({"contents": [{"parts": [{"text": "hi"}]}]}));
    }

    #[test]
    fn extracts_first_candidate_text() {
        let body = json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}, {"text": "second"}], "role": "model"}},
                {"content": {"parts": [{"text": "other"}]}}
            ],
            "usageMetadata": {"totalTokenCount": 12}
        })
        .to_string();
        assert_eq!(extract_text(&body).unwrap(), "first");
    }

    #[test]
    fn missing_candidates_is_an_envelope_error() {
        let err = extract_text(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap_err();
        assert!(matches!(err, ModelError::Envelope(_)));
        assert!(err.to_string().contains("`candidates`"));
    }

    #[test]
    fn empty_candidates_names_the_index() {
        let err = extract_text(r#"{"candidates": []}"#).unwrap_err();
        assert!(err.to_string().contains("`candidates[0]`"));
    }

    #[test]
    fn missing_parts_is_an_envelope_error() {
        let err = extract_text(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap_err();
        assert!(err.to_string().contains("candidates[0].content"));
    }

    #[test]
    fn non_string_text_is_rejected() {
        let err =
            extract_text(r#"{"candidates": [{"content": {"parts": [{"text": 42}]}}]}"#).unwrap_err();
        assert!(err.to_string().contains("not a string"));
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = extract_text("<html>oops</html>").unwrap_err();
        assert!(matches!(err, ModelError::Envelope(_)));
    }
}
