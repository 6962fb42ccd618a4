//! Returns API contracts
//!
//! The three backend calls the returns workflow depends on. [`ReturnsApi`]
//! is object-safe so a session can hold `Arc<dyn ReturnsApi>` and tests can
//! substitute their own backend.

use async_trait::async_trait;
use shared::{ApiResponse, CreditNoteRecord, LineItemRecord, ReturnRequest, SubmitReturnResponse};

use crate::client::HttpClient;
use crate::{ClientError, ClientResult};

/// Backend contract for the sales-return workflow
#[async_trait]
pub trait ReturnsApi: Send + Sync {
    /// `GET /api/transactions/{transaction_id}/line-items`
    async fn transaction_line_items(&self, transaction_id: &str)
    -> ClientResult<Vec<LineItemRecord>>;

    /// `POST /api/returns`
    async fn submit_return(&self, request: &ReturnRequest) -> ClientResult<SubmitReturnResponse>;

    /// `GET /api/credit-notes/{credit_note_id}`
    async fn credit_note(&self, credit_note_id: &str) -> ClientResult<CreditNoteRecord>;
}

/// [`ReturnsApi`] over any [`HttpClient`] transport
#[derive(Debug, Clone)]
pub struct ReturnsClient<H> {
    http: H,
}

impl<H: HttpClient> ReturnsClient<H> {
    pub fn new(http: H) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &H {
        &self.http
    }
}

/// Unwrap the success envelope, rejecting a success without data
fn into_data<T>(resp: ApiResponse<T>, what: &str) -> ClientResult<T> {
    if !resp.is_success() {
        return Err(ClientError::Api {
            code: resp.code.unwrap_or(1),
            message: resp.message,
            details: resp.details,
        });
    }
    resp.data
        .ok_or_else(|| ClientError::InvalidResponse(format!("Missing {} data", what)))
}

#[async_trait]
impl<H: HttpClient> ReturnsApi for ReturnsClient<H> {
    async fn transaction_line_items(
        &self,
        transaction_id: &str,
    ) -> ClientResult<Vec<LineItemRecord>> {
        let path = format!(
            "/api/transactions/{}/line-items",
            urlencoding::encode(transaction_id)
        );
        let resp: ApiResponse<Vec<LineItemRecord>> = self.http.get(&path).await?;
        into_data(resp, "line item")
    }

    async fn submit_return(&self, request: &ReturnRequest) -> ClientResult<SubmitReturnResponse> {
        let resp: ApiResponse<SubmitReturnResponse> =
            self.http.post("/api/returns", request).await?;
        into_data(resp, "credit note reference")
    }

    async fn credit_note(&self, credit_note_id: &str) -> ClientResult<CreditNoteRecord> {
        let path = format!("/api/credit-notes/{}", urlencoding::encode(credit_note_id));
        let resp: ApiResponse<CreditNoteRecord> = self.http.get(&path).await?;
        into_data(resp, "credit note")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_data_success() {
        let resp = ApiResponse::success(SubmitReturnResponse {
            credit_note_id: "CN-100".into(),
        });
        assert_eq!(into_data(resp, "x").unwrap().credit_note_id, "CN-100");
    }

    #[test]
    fn test_into_data_missing_payload() {
        let resp: ApiResponse<SubmitReturnResponse> = ApiResponse {
            code: Some(0),
            message: "OK".into(),
            data: None,
            details: None,
        };
        assert!(matches!(
            into_data(resp, "credit note reference"),
            Err(ClientError::InvalidResponse(m)) if m == "Missing credit note reference data"
        ));
    }

    #[test]
    fn test_into_data_error_envelope_with_ok_status() {
        let resp: ApiResponse<Vec<LineItemRecord>> = ApiResponse {
            code: Some(9003),
            message: "Service unavailable".into(),
            data: None,
            details: None,
        };
        assert!(matches!(
            into_data(resp, "line item"),
            Err(ClientError::Api { code: 9003, .. })
        ));
    }
}
