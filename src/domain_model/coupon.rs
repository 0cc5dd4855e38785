use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub discount_percentage: u8,
    pub expiration_date: DateTime<Utc>,
    pub is_active: bool,
}

impl Coupon {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date < now
    }
}

pub fn normalize_coupon_code(code: &str) -> String {
    code.trim().to_uppercase()
}
