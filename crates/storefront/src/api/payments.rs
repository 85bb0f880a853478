//! Payment intents.
//!
//! The backend creates the intent with the payment provider and hands back a
//! client secret. Confirming the card payment with that secret happens
//! outside this client.

use reqwest::Method;
use tracing::instrument;

use super::ApiClient;
use super::types::{PaymentIntent, PaymentIntentRequest};
use crate::error::{ApiError, Result};
use crate::session::AuthSession;

impl ApiClient {
    /// Create a payment intent for an order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidInput` for a non-positive amount, or an error
    /// if the API request fails.
    #[instrument(
        skip(self, auth, request),
        fields(order_id = %request.order_id, amount = request.amount, currency = request.currency.code())
    )]
    pub async fn create_payment_intent(
        &self,
        auth: &AuthSession,
        request: PaymentIntentRequest,
    ) -> Result<PaymentIntent> {
        if request.amount <= 0 {
            return Err(ApiError::InvalidInput(format!(
                "payment amount must be positive, got {}",
                request.amount
            )));
        }
        let url = self.endpoint(&["payments", "create-intent"])?;
        self.send(self.request(Method::POST, url, Some(auth)).json(&request))
            .await
    }
}
