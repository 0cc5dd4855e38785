use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use std::sync::Arc;

pub struct RealCouponService {
    coupon_repo: Arc<dyn CouponRepo>,
    clock: Arc<dyn Clock>,
}

impl RealCouponService {
    pub fn new(coupon_repo: Arc<dyn CouponRepo>, clock: Arc<dyn Clock>) -> Self {
        Self { coupon_repo, clock }
    }
}

/// Looks up an active coupon and rejects it once past its expiration date.
pub(crate) async fn find_usable_coupon(
    coupon_repo: &dyn CouponRepo,
    clock: &dyn Clock,
    code: &str,
) -> Result<Coupon, ShopError> {
    let code = normalize_coupon_code(code);
    if code.is_empty() {
        return Err(ShopError::bad_request("coupon code is required"));
    }
    let coupon = coupon_repo
        .find_active(&code)
        .await?
        .ok_or_else(|| ShopError::not_found("coupon not found"))?;
    if coupon.is_expired(clock.now()) {
        return Err(ShopError::bad_request("coupon expired"));
    }
    Ok(coupon)
}

#[async_trait::async_trait]
impl CouponService for RealCouponService {
    async fn active(&self) -> Result<Vec<Coupon>, ShopError> {
        self.coupon_repo.list_active().await
    }

    async fn validate(&self, code: &str) -> Result<Coupon, ShopError> {
        find_usable_coupon(self.coupon_repo.as_ref(), self.clock.as_ref(), code).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::*;
    use chrono::Duration;

    #[tokio::test]
    async fn validate_normalizes_and_checks_expiry() {
        let clock = Arc::new(ManualClock::default());
        let repo = Arc::new(MemoryCouponRepo::new());
        repo.insert(&Coupon {
            code: "SAVE20".to_string(),
            discount_percentage: 20,
            expiration_date: clock.now() + Duration::days(1),
            is_active: true,
        })
        .await
        .unwrap();
        repo.insert(&Coupon {
            code: "OLD".to_string(),
            discount_percentage: 5,
            expiration_date: clock.now() + Duration::days(1),
            is_active: false,
        })
        .await
        .unwrap();
        let service = RealCouponService::new(repo, clock.clone());

        assert_eq!(service.validate(" save20 ").await.unwrap().discount_percentage, 20);
        assert!(matches!(service.validate("").await, Err(ShopError::BadRequest(_))));
        assert!(matches!(service.validate("old").await, Err(ShopError::NotFound(_))));
        assert_eq!(service.active().await.unwrap().len(), 1);

        clock.advance(Duration::days(2));
        let err = service.validate("SAVE20").await.unwrap_err();
        assert_eq!(err.to_string(), "coupon expired");
    }
}
