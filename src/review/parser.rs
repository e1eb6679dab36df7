// src/review/parser.rs — Decode chat-completion replies into structured reviews
//
// The model's verdict arrives double-encoded: the envelope is JSON, and the
// first choice's `content` is a string that itself holds the review JSON.
//
// The review is decoded in explicit phases instead of straight into a struct:
//   1. parse into an ordered JSON map (`parameters` object, or the top-level
//      object for the older fixed layouts)
//   2. convert every entry into a `ReviewParameter`
//   3. check the attribute set against the configured schema

use serde_json::{Map, Value};

use super::{OutfitReview, ReviewParameter, ReviewSchema, MAX_SCORE};
use crate::infra::errors::MirrorsError;
use crate::provider::ChatCompletion;

/// Decode a raw transport body into a review.
pub fn parse_review_response(
    body: &[u8],
    schema: &ReviewSchema,
) -> Result<OutfitReview, MirrorsError> {
    let text = std::str::from_utf8(body).map_err(|e| {
        MirrorsError::decoding(
            format!("response body is not UTF-8: {e}"),
            String::from_utf8_lossy(body),
        )
    })?;

    let envelope: ChatCompletion = serde_json::from_str(text)
        .map_err(|e| MirrorsError::decoding(format!("unexpected response envelope: {e}"), text))?;

    if let Some(model) = &envelope.model {
        tracing::debug!(model = %model, "Model used");
    }
    if let Some(usage) = &envelope.usage {
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Token usage"
        );
    }

    let choice = envelope
        .choices
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| MirrorsError::InvalidResponse {
            status: None,
            message: "response contained no choices".into(),
        })?;

    if let Some(reason) = &choice.finish_reason {
        tracing::debug!(finish_reason = %reason, "Finish reason");
    }

    let content = choice
        .message
        .content
        .ok_or_else(|| MirrorsError::decoding("first choice has no message content", text))?;

    tracing::debug!(content = %content, "Response content");
    decode_review(&content, schema)
}

/// Decode the review JSON carried in a message's content string.
pub fn decode_review(text: &str, schema: &ReviewSchema) -> Result<OutfitReview, MirrorsError> {
    let attributes = attribute_map(text).map_err(|msg| {
        tracing::warn!("Review JSON parsing error: {}", msg);
        MirrorsError::decoding(msg, text)
    })?;

    let mut entries = Vec::with_capacity(attributes.len());
    for (name, value) in attributes {
        let param = decode_parameter(&name, &value).map_err(|msg| MirrorsError::decoding(msg, text))?;
        entries.push((name, param));
    }

    let review = OutfitReview::from_entries(entries);
    check_schema(&review, schema).map_err(|msg| MirrorsError::decoding(msg, text))?;
    Ok(review)
}

fn attribute_map(text: &str) -> Result<Map<String, Value>, String> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| format!("review is not valid JSON: {e}"))?;

    let Value::Object(mut root) = value else {
        return Err("review JSON is not an object".into());
    };

    let attributes = match root.remove("parameters") {
        Some(Value::Object(params)) => params,
        Some(_) => return Err("`parameters` is not an object".into()),
        // Older prompt revisions put the attributes at the top level.
        None => root,
    };

    if attributes.is_empty() {
        return Err("review contains no attributes".into());
    }
    Ok(attributes)
}

fn decode_parameter(name: &str, value: &Value) -> Result<ReviewParameter, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| format!("attribute `{name}` is not an object"))?;

    let score = obj
        .get("score")
        .and_then(Value::as_f64)
        .ok_or_else(|| format!("attribute `{name}` has no numeric score"))?;

    if !score.is_finite() || !(0.0..=MAX_SCORE).contains(&score) {
        return Err(format!(
            "attribute `{name}` score {score} is outside 0..={MAX_SCORE}"
        ));
    }

    let comment = obj
        .get("comment")
        .and_then(Value::as_str)
        .ok_or_else(|| format!("attribute `{name}` has no comment"))?;

    Ok(ReviewParameter {
        score,
        comment: comment.to_string(),
    })
}

fn check_schema(review: &OutfitReview, schema: &ReviewSchema) -> Result<(), String> {
    let ReviewSchema::Fixed(expected) = schema else {
        return Ok(());
    };

    let missing: Vec<&str> = expected
        .iter()
        .map(String::as_str)
        .filter(|k| review.get(k).is_none())
        .collect();
    let unexpected: Vec<&str> = review
        .names()
        .into_iter()
        .filter(|n| !expected.iter().any(|k| k == n))
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        return Ok(());
    }

    let mut problems = Vec::new();
    if !missing.is_empty() {
        problems.push(format!("missing attributes: {}", missing.join(", ")));
    }
    if !unexpected.is_empty() {
        problems.push(format!("unexpected attributes: {}", unexpected.join(", ")));
    }
    Err(problems.join("; "))
}
