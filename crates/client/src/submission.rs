//! Turn a cart into a persisted dispatch.
//!
//! Preconditions are checked in order before any network call: the cart has
//! items, its total quantity is positive, and a user is signed in. The
//! payload carries only `{product_code, qty}` pairs; the server picks the
//! batches. A reference-only create response is followed by exactly one
//! fetch of the new record.

use tracing::instrument;

use lotdispatch_core::{Cart, Dispatch, DispatchWarning, ServiceId};

use crate::error::ClientError;
use crate::response::CreateOutcome;
use crate::service::{DispatchService, NewDispatch, UserContext};

/// Submits carts through a [`DispatchService`] on behalf of the current user.
#[derive(Debug, Clone)]
pub struct DispatchSubmission<S, U> {
    service: S,
    user: U,
}

impl<S: DispatchService, U: UserContext> DispatchSubmission<S, U> {
    pub const fn new(service: S, user: U) -> Self {
        Self { service, user }
    }

    /// The underlying service.
    pub const fn service(&self) -> &S {
        &self.service
    }

    /// Build the create payload for `cart`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for an empty cart or a zero total,
    /// and `ClientError::NotAuthenticated` when no user is signed in.
    pub fn prepare(
        &self,
        cart: &Cart,
        service_id: Option<ServiceId>,
        notes: Option<String>,
    ) -> Result<NewDispatch, ClientError> {
        if cart.is_empty() {
            return Err(DispatchWarning::EmptyCart.into());
        }
        if cart.total_requested_qty() <= 0 {
            return Err(DispatchWarning::ZeroTotal.into());
        }
        let user_id = self
            .user
            .current_user()
            .ok_or(ClientError::NotAuthenticated)?;

        Ok(NewDispatch {
            user_id,
            service_id,
            notes: notes.filter(|n| !n.trim().is_empty()),
            items: cart.line_items(),
        })
    }

    /// Submit the cart and return the persisted dispatch.
    ///
    /// The cart is left untouched; clear it once the result is shown.
    ///
    /// # Errors
    ///
    /// Precondition failures as in [`DispatchSubmission::prepare`]. Any
    /// create failure, or the follow-up fetch's failure for a reference-only
    /// response, fails the whole submission.
    #[instrument(
        skip(self, cart, notes),
        fields(items = cart.len(), total_qty = cart.total_requested_qty())
    )]
    pub async fn submit(
        &self,
        cart: &Cart,
        service_id: Option<ServiceId>,
        notes: Option<String>,
    ) -> Result<Dispatch, ClientError> {
        let payload = self.prepare(cart, service_id, notes)?;

        let dispatch = match self.service.create(&payload).await? {
            CreateOutcome::Full(dispatch) => dispatch,
            CreateOutcome::Reference(id) => {
                tracing::debug!(dispatch_id = %id, "Create returned a reference, fetching record");
                self.service.get_by_id(id).await?
            }
        };

        tracing::info!(
            dispatch_id = %dispatch.id,
            details = dispatch.details.len(),
            "Dispatch submitted"
        );
        Ok(dispatch)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use lotdispatch_core::{
        Batch, DetailId, DispatchId, DispatchPage, DispatchRecord, InventoryId, Product,
        ProductCode, UserId,
    };
    use rust_decimal_macros::dec;

    use crate::query::DispatchFilters;

    /// In-memory service returning a scripted create outcome.
    struct FakeService {
        outcome: Mutex<Option<Result<CreateOutcome, ClientError>>>,
        fetch_fails: bool,
        calls: AtomicUsize,
        last_payload: Mutex<Option<NewDispatch>>,
    }

    impl FakeService {
        fn new(outcome: Result<CreateOutcome, ClientError>) -> Self {
            Self {
                outcome: Mutex::new(Some(outcome)),
                fetch_fails: false,
                calls: AtomicUsize::new(0),
                last_payload: Mutex::new(None),
            }
        }
    }

    impl DispatchService for FakeService {
        async fn list(&self, _filters: &DispatchFilters) -> Result<DispatchPage, ClientError> {
            Ok(DispatchPage::default())
        }

        async fn get_by_id(&self, id: DispatchId) -> Result<Dispatch, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fetch_fails {
                return Err(ClientError::server(404, Some("Dispatch not found".to_string())));
            }
            Ok(dispatch(id))
        }

        async fn create(&self, payload: &NewDispatch) -> Result<CreateOutcome, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_payload.lock().unwrap() = Some(payload.clone());
            self.outcome.lock().unwrap().take().unwrap()
        }
    }

    fn dispatch(id: DispatchId) -> Dispatch {
        Dispatch {
            id,
            date: None,
            service_id: None,
            service_name: None,
            notes: None,
            user_id: Some(UserId::new(1)),
            details: vec![DispatchRecord {
                detail_id: DetailId::new(1),
                inventory_id: InventoryId::new(10),
                product_code: ProductCode::new(5),
                product_name: "Gauze".to_string(),
                features: String::new(),
                presentation: String::new(),
                unit: "u".to_string(),
                batch_label: Some("L1".to_string()),
                expiry: None,
                qty: 3,
                unit_price: dec!(2),
                line_total: dec!(6),
            }],
        }
    }

    fn cart_with(qty: i64) -> Cart {
        let product = Product {
            code: ProductCode::new(5),
            name: "Gauze".to_string(),
            features: String::new(),
            presentation: String::new(),
            unit: "u".to_string(),
            total_stock: 10,
            batches: vec![Batch {
                inventory_id: InventoryId::new(10),
                code: Some("L1".to_string()),
                expiry: None,
                quantity: 10,
                unit_price: dec!(2),
                commitment_letter: false,
            }],
        };
        let mut cart = Cart::new();
        cart.add(&product, qty).unwrap();
        cart
    }

    #[tokio::test]
    async fn test_reference_response_fetches_record() {
        let service = FakeService::new(Ok(CreateOutcome::Reference(DispatchId::new(42))));
        let submission = DispatchSubmission::new(service, UserId::new(1));

        let result = submission.submit(&cart_with(3), None, None).await.unwrap();
        assert_eq!(result.id, DispatchId::new(42));
        assert_eq!(submission.service().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reference_fetch_failure_fails_submission() {
        let mut service = FakeService::new(Ok(CreateOutcome::Reference(DispatchId::new(42))));
        service.fetch_fails = true;
        let submission = DispatchSubmission::new(service, UserId::new(1));

        let err = submission.submit(&cart_with(3), None, None).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Server { status: 404, ref message } if message == "Dispatch not found"
        ));
    }

    #[tokio::test]
    async fn test_full_response_returned_without_fetch() {
        let service = FakeService::new(Ok(CreateOutcome::Full(dispatch(DispatchId::new(7)))));
        let submission = DispatchSubmission::new(service, UserId::new(1));

        let result = submission.submit(&cart_with(3), None, None).await.unwrap();
        assert_eq!(result.id, DispatchId::new(7));
        assert_eq!(submission.service().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_payload_carries_line_items_only() {
        let service = FakeService::new(Ok(CreateOutcome::Full(dispatch(DispatchId::new(7)))));
        let submission = DispatchSubmission::new(service, UserId::new(8));

        let cart = cart_with(4);
        submission
            .submit(&cart, Some(ServiceId::new(2)), Some("   ".to_string()))
            .await
            .unwrap();

        let payload = submission.service().last_payload.lock().unwrap().clone().unwrap();
        assert_eq!(payload.user_id, UserId::new(8));
        assert_eq!(payload.service_id, Some(ServiceId::new(2)));
        assert_eq!(payload.notes, None);
        assert_eq!(payload.items, cart.line_items());
        assert_eq!(cart.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cart_rejected_before_network() {
        let service = FakeService::new(Err(ClientError::NoData));
        let submission = DispatchSubmission::new(service, UserId::new(1));

        let err = submission.submit(&Cart::new(), None, None).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(DispatchWarning::EmptyCart)));
        assert_eq!(submission.service().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_user_rejected_before_network() {
        let service = FakeService::new(Err(ClientError::NoData));
        let submission = DispatchSubmission::new(service, None::<UserId>);

        let err = submission.submit(&cart_with(1), None, None).await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
        assert!(!err.is_validation());
        assert_eq!(submission.service().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_create_failure_propagates() {
        let service = FakeService::new(Err(ClientError::NoData));
        let submission = DispatchSubmission::new(service, UserId::new(1));

        let err = submission.submit(&cart_with(1), None, None).await.unwrap_err();
        assert!(matches!(err, ClientError::NoData));
    }
}
