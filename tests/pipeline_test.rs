// tests/pipeline_test.rs — Integration test: review pipeline with mock provider

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use mirrors::core::ReviewPipeline;
use mirrors::credits::{
    CreditLedger, LedgerStore, MemoryLedgerStore, MemoryTransactionLog, TransactionKind,
    TransactionLog,
};
use mirrors::infra::errors::MirrorsError;
use mirrors::prompt::PromptTemplate;
use mirrors::provider::ReviewProvider;
use mirrors::review::{decode_review, OutfitReview, ReviewSchema};

/// A mock provider that returns a canned review without any network call.
struct MockProvider {
    reply: Result<String, ()>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockProvider {
    fn succeeding(content: &str) -> Self {
        Self {
            reply: Ok(content.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    fn failing() -> Self {
        Self {
            reply: Err(()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReviewProvider for MockProvider {
    fn id(&self) -> &str {
        "mock"
    }

    async fn fetch_review(
        &self,
        _image: &[u8],
        prompt: &str,
    ) -> Result<OutfitReview, MirrorsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match &self.reply {
            Ok(content) => decode_review(content, &ReviewSchema::Open),
            Err(()) => Err(MirrorsError::RequestFailed {
                message: "connection reset".into(),
                timeout: false,
            }),
        }
    }
}

const REVIEW: &str = r#"{"parameters":{"fit":{"score":4,"comment":"Clean lines."},"color":{"score":3.5,"comment":"A bit muted."}}}"#;

fn ledger(initial: u32) -> (Arc<CreditLedger>, MemoryLedgerStore, MemoryTransactionLog) {
    let store = MemoryLedgerStore::new();
    let log = MemoryTransactionLog::new();
    let ledger =
        CreditLedger::initialize(Box::new(store.clone()), Box::new(log.clone()), initial).unwrap();
    (Arc::new(ledger), store, log)
}

fn template() -> PromptTemplate {
    PromptTemplate::builtin()
}

#[tokio::test]
async fn test_success_debits_one_snap() {
    let (ledger, store, log) = ledger(3);
    let provider = Arc::new(MockProvider::succeeding(REVIEW));
    let pipeline = ReviewPipeline::new(provider.clone(), ledger.clone(), template());

    let outcome = pipeline.submit(b"jpeg bytes").await.unwrap();

    assert_eq!(outcome.remaining_snaps, 2);
    assert_eq!(outcome.review.names(), vec!["fit", "color"]);
    assert_eq!(ledger.balance(), 2);
    assert_eq!(store.read_balance().unwrap(), Some(2));
    assert_eq!(provider.calls(), 1);

    let consumptions: Vec<_> = log
        .entries()
        .unwrap()
        .into_iter()
        .filter(|t| t.kind == TransactionKind::Consumption)
        .collect();
    assert_eq!(consumptions.len(), 1);
    assert_eq!(consumptions[0].amount, -1);
}

#[tokio::test]
async fn test_zero_balance_never_calls_provider() {
    let (ledger, _store, _log) = ledger(0);
    let provider = Arc::new(MockProvider::succeeding(REVIEW));
    let pipeline = ReviewPipeline::new(provider.clone(), ledger.clone(), template());

    assert!(!ledger.has_available_snaps());
    let err = pipeline.submit(b"jpeg bytes").await.unwrap_err();

    assert!(matches!(err, MirrorsError::NoSnapsRemaining));
    assert_eq!(provider.calls(), 0);
    assert_eq!(ledger.balance(), 0);
}

#[tokio::test]
async fn test_failed_request_consumes_nothing() {
    let (ledger, _store, log) = ledger(2);
    let provider = Arc::new(MockProvider::failing());
    let pipeline = ReviewPipeline::new(provider.clone(), ledger.clone(), template());

    let err = pipeline.submit(b"jpeg bytes").await.unwrap_err();

    assert!(matches!(err, MirrorsError::RequestFailed { .. }));
    assert_eq!(ledger.balance(), 2);
    assert_eq!(log.entries().unwrap().len(), 1);
}

#[tokio::test]
async fn test_undecodable_reply_consumes_nothing() {
    let (ledger, _store, _log) = ledger(1);
    let provider = Arc::new(MockProvider::succeeding("not json at all"));
    let pipeline = ReviewPipeline::new(provider, ledger.clone(), template());

    let err = pipeline.submit(b"jpeg bytes").await.unwrap_err();
    assert_eq!(err.raw_text(), Some("not json at all"));
    assert_eq!(ledger.balance(), 1);
}

#[tokio::test]
async fn test_prompt_carries_input_section() {
    let (ledger, _store, _log) = ledger(1);
    let provider = Arc::new(MockProvider::succeeding(REVIEW));
    let pipeline = ReviewPipeline::new(provider.clone(), ledger, template());

    pipeline.submit(b"jpeg bytes").await.unwrap();

    let prompt = provider.last_prompt.lock().unwrap().clone().unwrap();
    assert_eq!(prompt.matches("**Input:**").count(), 1);
    assert!(prompt.contains("- Image: [attach image]"));
    assert!(prompt.contains("- Time of day: ("));
}

#[tokio::test]
async fn test_last_snap_then_exhausted() {
    let (ledger, _store, _log) = ledger(1);
    let provider = Arc::new(MockProvider::succeeding(REVIEW));
    let pipeline = ReviewPipeline::new(provider.clone(), ledger, template());

    let first = pipeline.submit(b"a").await.unwrap();
    assert_eq!(first.remaining_snaps, 0);

    let err = pipeline.submit(b"b").await.unwrap_err();
    assert!(matches!(err, MirrorsError::NoSnapsRemaining));
    assert_eq!(provider.calls(), 1);
}
