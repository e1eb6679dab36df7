// src/core/pipeline.rs — One review, end to end
//
// balance check → prompt → provider call → decode → debit one snap.
// A failed request consumes nothing.

use std::sync::Arc;
use std::time::Instant;

use crate::credits::CreditLedger;
use crate::infra::errors::MirrorsError;
use crate::prompt::{current_time_of_day, PromptTemplate};
use crate::provider::ReviewProvider;
use crate::review::OutfitReview;

#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub review: OutfitReview,
    pub remaining_snaps: u32,
}

pub struct ReviewPipeline {
    provider: Arc<dyn ReviewProvider>,
    ledger: Arc<CreditLedger>,
    template: PromptTemplate,
}

impl ReviewPipeline {
    pub fn new(
        provider: Arc<dyn ReviewProvider>,
        ledger: Arc<CreditLedger>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            provider,
            ledger,
            template,
        }
    }

    pub async fn submit(&self, image: &[u8]) -> Result<ReviewOutcome, MirrorsError> {
        if !self.ledger.has_available_snaps() {
            return Err(MirrorsError::NoSnapsRemaining);
        }

        let prompt = self.template.build(&current_time_of_day());
        tracing::info!(
            provider = self.provider.id(),
            template = %self.template.source,
            image_bytes = image.len(),
            "Requesting outfit review"
        );

        let started = Instant::now();
        let review = match self.provider.fetch_review(image, &prompt).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!("Processing failed: {}", e);
                return Err(e);
            }
        };
        tracing::info!(
            attributes = review.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Review decoded"
        );

        if !self.ledger.use_snap() {
            return Err(MirrorsError::NoSnapsRemaining);
        }

        Ok(ReviewOutcome {
            review,
            remaining_snaps: self.ledger.balance(),
        })
    }
}
