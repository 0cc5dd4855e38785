use crate::application_impl::{apply_discount, sum_line_totals};
use crate::application_port::*;
use crate::domain_port::*;
use dashmap::DashMap;

/// Stands in for a hosted checkout provider. Sessions are created paid unless
/// `auto_pay` is off, in which case `mark_paid` settles them.
pub struct FakePaymentGateway {
    sessions: DashMap<String, PaymentSession>,
    auto_pay: bool,
}

impl FakePaymentGateway {
    pub fn new() -> Self {
        Self::with_auto_pay(true)
    }

    pub fn with_auto_pay(auto_pay: bool) -> Self {
        Self {
            sessions: DashMap::new(),
            auto_pay,
        }
    }

    pub fn mark_paid(&self, id: &str) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) => {
                session.paid = true;
                true
            }
            None => false,
        }
    }
}

impl Default for FakePaymentGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PaymentGateway for FakePaymentGateway {
    async fn create_session(
        &self,
        request: PaymentSessionRequest,
    ) -> Result<PaymentSession, ShopError> {
        let subtotal = sum_line_totals(
            request
                .line_items
                .iter()
                .map(|l| (l.unit_amount_cents, l.quantity)),
        )?;
        let amount_total_cents = apply_discount(subtotal, request.discount_percentage)?;
        let session = PaymentSession {
            id: format!("cs_fake_{}", uuid::Uuid::new_v4().simple()),
            paid: self.auto_pay,
            amount_total_cents,
            metadata: request.metadata,
        };
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn retrieve_session(&self, id: &str) -> Result<Option<PaymentSession>, ShopError> {
        Ok(self.sessions.get(id).map(|s| s.value().clone()))
    }
}
