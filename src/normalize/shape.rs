use agent_contract::ResponseBody;
use serde_json::Value;

/// Nested JSON-in-a-string layers followed before giving up.
const MAX_STRING_DEPTH: usize = 8;

/// Known response body shapes, in resolution priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// Nothing usable: empty body, `null`, `false`, `0`, or `""`.
    Empty,
    /// Text that is not JSON, typically a streamed frame sequence.
    Raw(String),
    /// Object with a truthy `content`.
    Content(Value),
    /// Object with a non-empty `messages` array; holds the last element's `content`.
    LastMessage(Value),
    /// Object with a truthy `message`.
    Message(Value),
    /// Object with a non-empty `choices` array; holds `choices[0].message.content`.
    Choice(Value),
    /// Any other JSON value.
    Unknown(Value),
}

impl ResponseShape {
    pub fn resolve(body: &ResponseBody) -> Self {
        match body {
            ResponseBody::Empty => Self::Empty,
            ResponseBody::Text(text) => Self::from_text(text, 0),
            ResponseBody::Json(value) => Self::from_value(value, 0),
        }
    }

    fn from_text(text: &str, depth: usize) -> Self {
        if text.trim().is_empty() {
            return Self::Empty;
        }
        if depth >= MAX_STRING_DEPTH {
            return Self::Raw(text.to_string());
        }
        match serde_json::from_str::<Value>(text) {
            Ok(parsed) => Self::from_value(&parsed, depth + 1),
            Err(_) => Self::Raw(text.to_string()),
        }
    }

    fn from_value(value: &Value, depth: usize) -> Self {
        if !is_truthy(value) {
            return Self::Empty;
        }

        let object = match value {
            Value::String(text) => return Self::from_text(text, depth),
            Value::Object(object) => object,
            other => return Self::Unknown(other.clone()),
        };

        if let Some(content) = object.get("content").filter(|content| is_truthy(content)) {
            return Self::Content(content.clone());
        }

        if let Some(last) = object
            .get("messages")
            .and_then(Value::as_array)
            .and_then(|messages| messages.last())
        {
            return Self::LastMessage(last.get("content").cloned().unwrap_or(Value::Null));
        }

        if let Some(message) = object.get("message").filter(|message| is_truthy(message)) {
            return Self::Message(message.clone());
        }

        if let Some(first) = object
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
        {
            let content = first
                .get("message")
                .and_then(|message| message.get("content"))
                .cloned()
                .unwrap_or(Value::Null);
            return Self::Choice(content);
        }

        Self::Unknown(value.clone())
    }

    /// Text extracted from this shape, before cleanup.
    ///
    /// Non-string payloads are rendered as compact JSON; falsy payloads are empty.
    pub fn into_text(self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Raw(text) => text,
            Self::Content(value)
            | Self::LastMessage(value)
            | Self::Message(value)
            | Self::Choice(value)
            | Self::Unknown(value) => value_text(value),
        }
    }
}

fn value_text(value: Value) -> String {
    if !is_truthy(&value) {
        return String::new();
    }
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// Truthiness as the agent's web clients evaluate it.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
