// src/cli/review.rs — Run a review and render it

use std::path::Path;

use crate::core::{ReviewOutcome, ReviewPipeline};
use crate::infra::errors::MirrorsError;
use crate::review::OutfitReview;

pub async fn run_review(pipeline: &ReviewPipeline, image: &Path, json: bool) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .map_err(|e| anyhow::anyhow!("Could not load image {}: {}", image.display(), e))?;

    let ReviewOutcome {
        review,
        remaining_snaps,
    } = match pipeline.submit(&bytes).await {
        Ok(outcome) => outcome,
        Err(e) => {
            if !json {
                if let Some(view) = unavailable_view(&e) {
                    print!("{}", view);
                }
            }
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&review)?);
    } else {
        print!("{}", render_review(&review));
        println!();
        println!("  {} snaps left", remaining_snaps);
    }
    Ok(())
}

/// One row per attribute, in review order: name, score, band, comment.
pub fn render_review(review: &OutfitReview) -> String {
    let width = review.iter().map(|(n, _)| display_name(n).len()).max().unwrap_or(0);

    let mut out = String::new();
    for (name, param) in review.iter() {
        out.push_str(&format!(
            "  {:<width$}  {:>4.1}  {:<9}  {}\n",
            display_name(name),
            param.score,
            param.band().label(),
            param.comment,
        ));
    }
    out
}

/// N/A table shown when the reply arrived but held no usable review.
fn unavailable_view(err: &MirrorsError) -> Option<String> {
    match err {
        MirrorsError::Decoding { .. } => Some(render_review(&OutfitReview::placeholder())),
        _ => None,
    }
}

/// `step_out_readiness` → `Step out readiness`
fn display_name(name: &str) -> String {
    let spaced = name.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
