//! End-to-end returns workflow against the in-memory backend, driven
//! in-process through the oneshot transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{
    CreditNoteRecord, LineItemError, LineItemRecord, Operator, ReturnRequest,
    SubmitReturnResponse,
};
use stockroom_client::{
    ClientError, ClientResult, OneshotHttpClient, ReturnsApi, ReturnsClient,
};
use stockroom_mock::{AppState, build_app};
use stockroom_returns::{
    CreditNoteRenderer, DEFAULT_LINE_WIDTH, LoadError, LookupError, LookupOutcome,
    NoCandidates, QuantityIssue, ReturnSession, SessionError, SessionPhase, SubmissionError,
    TransactionLookup, ValidationField, ValidationIssue,
};

fn backend() -> Arc<dyn ReturnsApi> {
    let app = build_app(Arc::new(AppState::with_demo_data()));
    Arc::new(ReturnsClient::new(OneshotHttpClient::new(app)))
}

fn session(api: Arc<dyn ReturnsApi>) -> ReturnSession {
    ReturnSession::new(api, Operator::new("emp-1", "Ada"))
}

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_tx001_return_produces_credit_note() {
    let session = session(backend());

    let outcome = session.lookup("TX-001").await.unwrap();
    let candidates = outcome.candidates().unwrap();
    assert_eq!(candidates.len(), 1);
    assert!(candidates.contains("a"));
    assert!(!candidates.contains("b"));

    session.select("a").unwrap();
    assert_eq!(
        session.with_selection(|s| s.total_refund()),
        Some(d("1000"))
    );

    session.set_quantity("a", "5").unwrap();
    assert_eq!(
        session.with_selection(|s| s.total_refund()),
        Some(d("5000"))
    );

    let err = session.set_quantity("a", "6").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Selection(stockroom_returns::SelectionError::ExceedsAvailable { max: 5, .. })
    ));
    assert_eq!(
        session.with_selection(|s| s.total_refund()),
        Some(d("5000"))
    );

    session.set_quantity("a", "2").unwrap();
    match session.submit("").await {
        Err(SessionError::Validation(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(
                errors.get(&ValidationField::Reason),
                Some(&ValidationIssue::Required)
            );
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(session.with_selection(|s| s.quantity("a")), Some(Some(2)));

    let credit_note_id = session.submit("Defective").await.unwrap();
    assert_eq!(credit_note_id, "CN-100");
    assert!(session.selection().is_none());
    assert!(session.transaction_id().is_none());

    let record = session.load_credit_note(&credit_note_id).await.unwrap();
    assert_eq!(record.total_quantity(), 2);
    assert_eq!(record.total_refund(), d("2000"));
    assert_eq!(record.processed_by.as_deref(), Some("emp-1"));

    let text = CreditNoteRenderer::render_text(&record, DEFAULT_LINE_WIDTH);
    assert!(text.contains("CN-100"));
    assert!(text.contains("Rice 5kg"));
}

#[tokio::test]
async fn test_zero_candidate_outcomes_are_distinguished() {
    let session = session(backend());

    let cases = [
        ("TX-404", NoCandidates::NotFound),
        ("TX-002", NoCandidates::FullyReturned),
        ("TX-003", NoCandidates::NotStocked),
    ];
    for (id, expected) in cases {
        match session.lookup(id).await.unwrap() {
            LookupOutcome::NoCandidates { reason, .. } => assert_eq!(reason, expected),
            other => panic!("{id}: expected no candidates, got {other:?}"),
        }
        assert!(session.selection().is_none());
        assert!(matches!(
            session.select("a"),
            Err(SessionError::NoTransaction)
        ));
    }
}

/// Backend that counts calls and serves a fixed set of line items
struct CountingApi {
    calls: AtomicUsize,
    records: Vec<LineItemRecord>,
}

impl CountingApi {
    fn new(records: Vec<LineItemRecord>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            records,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReturnsApi for CountingApi {
    async fn transaction_line_items(
        &self,
        _transaction_id: &str,
    ) -> ClientResult<Vec<LineItemRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.clone())
    }

    async fn submit_return(&self, _request: &ReturnRequest) -> ClientResult<SubmitReturnResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SubmitReturnResponse {
            credit_note_id: "CN-100".into(),
        })
    }

    async fn credit_note(&self, credit_note_id: &str) -> ClientResult<CreditNoteRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ClientError::NotFound(credit_note_id.to_string()))
    }
}

fn record(id: &str, sold: u32, returnable: u32) -> LineItemRecord {
    LineItemRecord {
        id: id.to_string(),
        transaction_id: "TX-001".to_string(),
        quantity_sold: sold,
        quantity_returnable: returnable,
        sold_price: None,
        unit_price: Some(Decimal::from(1000)),
        stock_item_id: Some(format!("stock-{id}")),
        item_name: None,
        sku: None,
        client_name: None,
        client_email: None,
        client_phone: None,
    }
}

#[tokio::test]
async fn test_blank_identifiers_rejected_without_backend_call() {
    let api = CountingApi::new(vec![record("a", 5, 5)]);
    let session = session(api.clone());

    for blank in ["", "   ", "\t\n"] {
        assert!(matches!(
            session.lookup(blank).await,
            Err(SessionError::Lookup(LookupError::EmptyIdentifier))
        ));
        assert!(matches!(
            session.load_credit_note(blank).await,
            Err(SessionError::Load(LoadError::EmptyIdentifier))
        ));
    }
    assert!(matches!(
        TransactionLookup::new(api.clone()).lookup("  ").await,
        Err(LookupError::EmptyIdentifier)
    ));
    assert!(matches!(
        CreditNoteRenderer::new(api.clone()).load("").await,
        Err(LoadError::EmptyIdentifier)
    ));
    assert_eq!(api.calls(), 0);
    assert_eq!(session.phase(), SessionPhase::Idle);

    session.lookup(" TX-001 ").await.unwrap();
    assert_eq!(api.calls(), 1);
    assert_eq!(session.transaction_id().as_deref(), Some("TX-001"));
}

#[tokio::test]
async fn test_malformed_record_fails_whole_lookup() {
    let api = CountingApi::new(vec![record("a", 5, 5), record("b", 2, 3)]);
    let session = session(api.clone());

    match session.lookup("TX-001").await {
        Err(SessionError::Lookup(LookupError::Malformed(
            LineItemError::ReturnableExceedsSold {
                id,
                returnable,
                sold,
            },
        ))) => {
            assert_eq!(id, "b");
            assert_eq!((returnable, sold), (3, 2));
        }
        other => panic!("expected malformed lookup, got {other:?}"),
    }
    assert!(session.selection().is_none());
    assert!(session.transaction_id().is_none());
    assert_eq!(session.phase(), SessionPhase::Idle);
}

#[tokio::test]
async fn test_missing_credit_note_surfaces_backend_message() {
    let session = session(backend());
    let err = session.load_credit_note("CN-999").await.unwrap_err();
    assert_eq!(err.to_string(), "Credit note CN-999 not found");
}

#[tokio::test]
async fn test_lump_price_refund_matches_backend() {
    let session = session(backend());
    session.lookup("TX-004").await.unwrap();
    session.select("d").unwrap();
    session.set_quantity("d", "3").unwrap();
    assert_eq!(
        session.with_selection(|s| s.total_refund()),
        Some(d("99.99"))
    );

    let id = session.submit("Wrong size").await.unwrap();
    let record = session.load_credit_note(&id).await.unwrap();
    assert_eq!(record.total_refund(), d("99.99"));
}

#[tokio::test]
async fn test_concurrent_return_is_a_quantity_conflict() {
    let api = backend();
    let first = session(api.clone());
    let second = session(api);

    first.lookup("TX-001").await.unwrap();
    first.select("a").unwrap();
    first.set_quantity("a", "5").unwrap();

    second.lookup("TX-001").await.unwrap();
    second.select("a").unwrap();
    second.set_quantity("a", "3").unwrap();
    assert_eq!(second.submit("Damaged").await.unwrap(), "CN-100");

    let err = first.submit("Defective").await.unwrap_err();
    assert!(err.is_quantity_conflict());
    match &err {
        SessionError::Submission(SubmissionError::QuantityConflict {
            line_item_id,
            available,
            ..
        }) => {
            assert_eq!(line_item_id.as_deref(), Some("a"));
            assert_eq!(*available, Some(2));
        }
        other => panic!("unexpected {other:?}"),
    }
    // Selection survives the rejection
    assert_eq!(first.with_selection(|s| s.quantity("a")), Some(Some(5)));

    let refreshed = first.refresh().await.unwrap();
    assert!(refreshed.dropped.is_empty());
    assert_eq!(
        first.with_selection(|s| s.line_error("a").cloned()),
        Some(Some(QuantityIssue::ExceedsAvailable {
            requested: 5,
            max: 2
        }))
    );
    assert!(matches!(
        first.submit("Defective").await,
        Err(SessionError::Validation(_))
    ));

    first.set_quantity("a", "2").unwrap();
    assert_eq!(first.submit("Defective").await.unwrap(), "CN-101");

    // Nothing left on TX-001 now
    match first.lookup("TX-001").await.unwrap() {
        LookupOutcome::NoCandidates { reason, .. } => {
            assert_eq!(reason, NoCandidates::FullyReturned)
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn test_refresh_without_transaction() {
    let session = session(backend());
    assert!(matches!(
        session.refresh().await,
        Err(SessionError::NoTransaction)
    ));
}
