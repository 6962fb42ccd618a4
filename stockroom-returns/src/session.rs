//! Return authoring session
//!
//! Owns the state of one in-progress return and sequences the backend calls
//! made for it:
//!
//! - at most one lookup or submission is in flight; a second one, or a
//!   selection change while one is pending, fails with [`SessionError::Busy`]
//! - [`ReturnSession::reset`] starts a new epoch; a response to a call made
//!   in an older epoch is dropped with [`SessionError::Discarded`]
//! - state sits behind a `parking_lot::Mutex` that is never held across an
//!   `.await`

use std::sync::Arc;

use parking_lot::Mutex;
use shared::{CreditNoteRecord, Operator};
use stockroom_client::ReturnsApi;

use crate::credit_note::CreditNoteRenderer;
use crate::error::SessionError;
use crate::lookup::{LookupOutcome, TransactionLookup};
use crate::selection::ReturnSelectionState;
use crate::submission::{ReturnSubmission, validate_and_build};

/// Which backend call, if any, is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    LookingUp,
    Submitting,
}

/// Result of [`ReturnSession::refresh`]
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    pub outcome: LookupOutcome,
    /// Selected lines that are no longer candidates and were removed
    pub dropped: Vec<String>,
}

#[derive(Debug)]
struct Inner {
    epoch: u64,
    phase: SessionPhase,
    /// Last transaction id looked up successfully
    transaction_id: Option<String>,
    /// Present while the transaction has candidates
    selection: Option<ReturnSelectionState>,
}

impl Inner {
    fn selection_mut(&mut self) -> Result<&mut ReturnSelectionState, SessionError> {
        if self.phase != SessionPhase::Idle {
            return Err(SessionError::Busy);
        }
        self.selection.as_mut().ok_or(SessionError::NoTransaction)
    }
}

/// Marks a call in flight; clears the mark on drop unless the session was
/// reset meanwhile
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    epoch: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock();
        if inner.epoch == self.epoch {
            inner.phase = SessionPhase::Idle;
        }
    }
}

/// One return authoring session for one operator
pub struct ReturnSession {
    lookup: TransactionLookup,
    submission: ReturnSubmission,
    renderer: CreditNoteRenderer,
    operator: Operator,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for ReturnSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReturnSession")
            .field("operator", &self.operator)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl ReturnSession {
    pub fn new(api: Arc<dyn ReturnsApi>, operator: Operator) -> Self {
        Self {
            lookup: TransactionLookup::new(api.clone()),
            submission: ReturnSubmission::new(api.clone()),
            renderer: CreditNoteRenderer::new(api),
            operator,
            inner: Mutex::new(Inner {
                epoch: 0,
                phase: SessionPhase::Idle,
                transaction_id: None,
                selection: None,
            }),
        }
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.lock().phase
    }

    pub fn transaction_id(&self) -> Option<String> {
        self.inner.lock().transaction_id.clone()
    }

    /// Copy of the current selection, if a transaction with candidates is loaded
    pub fn selection(&self) -> Option<ReturnSelectionState> {
        self.inner.lock().selection.clone()
    }

    /// Read the current selection without copying it
    pub fn with_selection<R>(&self, f: impl FnOnce(&ReturnSelectionState) -> R) -> Option<R> {
        self.inner.lock().selection.as_ref().map(f)
    }

    fn begin(&self, phase: SessionPhase) -> Result<InFlight<'_>, SessionError> {
        let mut inner = self.inner.lock();
        if inner.phase != SessionPhase::Idle {
            return Err(SessionError::Busy);
        }
        inner.phase = phase;
        Ok(InFlight {
            inner: &self.inner,
            epoch: inner.epoch,
        })
    }

    /// Look up a transaction, replacing whatever the session held
    pub async fn lookup(&self, transaction_id: &str) -> Result<LookupOutcome, SessionError> {
        let flight = self.begin(SessionPhase::LookingUp)?;
        let result = self.lookup.lookup(transaction_id).await;

        let mut inner = self.inner.lock();
        if inner.epoch != flight.epoch {
            tracing::debug!(transaction_id = %transaction_id.trim(), "Dropping stale lookup response");
            return Err(SessionError::Discarded);
        }
        let outcome = result?;
        inner.selection = outcome.candidates().cloned().map(ReturnSelectionState::new);
        inner.transaction_id = Some(transaction_id.trim().to_string());
        drop(inner);
        drop(flight);
        Ok(outcome)
    }

    /// Re-run the lookup for the current transaction, keeping the selection
    /// where the lines are still candidates
    pub async fn refresh(&self) -> Result<RefreshOutcome, SessionError> {
        let transaction_id = self
            .transaction_id()
            .ok_or(SessionError::NoTransaction)?;
        let flight = self.begin(SessionPhase::LookingUp)?;
        let result = self.lookup.lookup(&transaction_id).await;

        let mut inner = self.inner.lock();
        if inner.epoch != flight.epoch {
            return Err(SessionError::Discarded);
        }
        let outcome = result?;
        let dropped = match outcome.candidates() {
            Some(set) => {
                if let Some(selection) = inner.selection.as_mut() {
                    selection.replace_candidates(set.clone())
                } else {
                    inner.selection = Some(ReturnSelectionState::new(set.clone()));
                    Vec::new()
                }
            }
            None => inner
                .selection
                .take()
                .map(|s| s.lines().iter().map(|l| l.item.id.clone()).collect::<Vec<_>>())
                .unwrap_or_default(),
        };
        if !dropped.is_empty() {
            tracing::info!(transaction_id = %transaction_id, dropped = ?dropped, "Selection lines no longer returnable");
        }
        drop(inner);
        drop(flight);
        Ok(RefreshOutcome { outcome, dropped })
    }

    pub fn select(&self, line_item_id: &str) -> Result<(), SessionError> {
        Ok(self.inner.lock().selection_mut()?.select(line_item_id)?)
    }

    pub fn select_all(&self) -> Result<usize, SessionError> {
        Ok(self.inner.lock().selection_mut()?.select_all())
    }

    pub fn deselect(&self, line_item_id: &str) -> Result<(), SessionError> {
        self.inner.lock().selection_mut()?.deselect(line_item_id);
        Ok(())
    }

    pub fn clear_selection(&self) -> Result<(), SessionError> {
        self.inner.lock().selection_mut()?.clear();
        Ok(())
    }

    pub fn set_quantity(&self, line_item_id: &str, value: &str) -> Result<(), SessionError> {
        self.inner
            .lock()
            .selection_mut()?
            .set_quantity(line_item_id, value)
            .map_err(SessionError::from)
    }

    /// Validate and submit the selection, returning the credit note id.
    ///
    /// Invalid input fails without a network call. Any failure leaves the
    /// selection as it was; success clears the session.
    pub async fn submit(&self, reason: &str) -> Result<String, SessionError> {
        let (request, flight) = {
            let mut inner = self.inner.lock();
            if inner.phase != SessionPhase::Idle {
                return Err(SessionError::Busy);
            }
            let selection = inner.selection.as_ref().ok_or(SessionError::NoTransaction)?;
            let request = validate_and_build(
                selection,
                reason,
                selection.transaction_id(),
                &self.operator,
            )?;
            inner.phase = SessionPhase::Submitting;
            let flight = InFlight {
                inner: &self.inner,
                epoch: inner.epoch,
            };
            (request, flight)
        };

        let result = self.submission.submit(&request).await;

        let mut inner = self.inner.lock();
        if inner.epoch != flight.epoch {
            if let Ok(response) = &result {
                tracing::warn!(
                    credit_note_id = %response.credit_note_id,
                    transaction_id = %request.transaction_id,
                    "Return recorded after the session was reset"
                );
            }
            return Err(SessionError::Discarded);
        }
        let response = result?;
        inner.selection = None;
        inner.transaction_id = None;
        drop(inner);
        drop(flight);
        Ok(response.credit_note_id)
    }

    /// Load a credit note; independent of the in-flight slot
    pub async fn load_credit_note(
        &self,
        credit_note_id: &str,
    ) -> Result<CreditNoteRecord, SessionError> {
        Ok(self.renderer.load(credit_note_id).await?)
    }

    /// Discard all state. Pending calls finish into [`SessionError::Discarded`].
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.phase = SessionPhase::Idle;
        inner.transaction_id = None;
        inner.selection = None;
        tracing::debug!(epoch = inner.epoch, "Return session reset");
    }
}

