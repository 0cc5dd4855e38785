use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryCouponRepo {
    coupons: DashMap<String, Coupon>,
}

impl MemoryCouponRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CouponRepo for MemoryCouponRepo {
    async fn list_active(&self) -> Result<Vec<Coupon>, ShopError> {
        let mut coupons: Vec<Coupon> = self
            .coupons
            .iter()
            .filter(|c| c.is_active)
            .map(|c| c.value().clone())
            .collect();
        coupons.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(coupons)
    }

    async fn find_active(&self, code: &str) -> Result<Option<Coupon>, ShopError> {
        Ok(self
            .coupons
            .get(code)
            .filter(|c| c.is_active)
            .map(|c| c.value().clone()))
    }

    async fn insert(&self, coupon: &Coupon) -> Result<(), ShopError> {
        self.coupons.insert(coupon.code.clone(), coupon.clone());
        Ok(())
    }
}
