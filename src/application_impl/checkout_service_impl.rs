use super::coupon_service_impl::find_usable_coupon;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use chrono::Duration;
use std::sync::Arc;

const REWARD_CODE_PREFIX: &str = "GIFT";
const REWARD_CODE_ALPHABET: [char; 36] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
];

fn total_out_of_range() -> ShopError {
    ShopError::bad_request("order total out of range")
}

/// `total * (100 - percentage) / 100`, rounded half up.
pub fn apply_discount(total_cents: i64, percentage: u8) -> Result<i64, ShopError> {
    let percentage = i64::from(percentage.min(100));
    if percentage == 0 {
        return Ok(total_cents);
    }
    total_cents
        .checked_mul(100 - percentage)
        .and_then(|v| v.checked_add(50))
        .map(|v| v.div_euclid(100))
        .ok_or_else(total_out_of_range)
}

/// Sum of `price * quantity` over `(price_cents, quantity)` pairs.
pub fn sum_line_totals(lines: impl IntoIterator<Item = (i64, u32)>) -> Result<i64, ShopError> {
    lines.into_iter().try_fold(0i64, |acc, (price_cents, quantity)| {
        price_cents
            .checked_mul(i64::from(quantity))
            .and_then(|line| acc.checked_add(line))
            .ok_or_else(total_out_of_range)
    })
}

#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutUrls {
    pub fn for_client(client_url: &str) -> Self {
        let base = client_url.trim_end_matches('/');
        Self {
            success_url: format!("{base}/purchase-success?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{base}/purchase-cancel"),
        }
    }
}

pub struct RealCheckoutService {
    payment_gateway: Arc<dyn PaymentGateway>,
    coupon_repo: Arc<dyn CouponRepo>,
    order_repo: Arc<dyn OrderRepo>,
    cart_repo: Arc<dyn CartRepo>,
    clock: Arc<dyn Clock>,
    urls: CheckoutUrls,
}

impl RealCheckoutService {
    pub fn new(
        payment_gateway: Arc<dyn PaymentGateway>,
        coupon_repo: Arc<dyn CouponRepo>,
        order_repo: Arc<dyn OrderRepo>,
        cart_repo: Arc<dyn CartRepo>,
        clock: Arc<dyn Clock>,
        urls: CheckoutUrls,
    ) -> Self {
        Self {
            payment_gateway,
            coupon_repo,
            order_repo,
            cart_repo,
            clock,
            urls,
        }
    }

    fn validate_lines(lines: &[CheckoutLine]) -> Result<Vec<(ProductId, &CheckoutLine, u32)>, ShopError> {
        if lines.is_empty() {
            return Err(ShopError::bad_request("invalid or empty products array"));
        }
        lines
            .iter()
            .map(|line| match line.product_id {
                Some(id) if !line.name.trim().is_empty() && line.price_cents > 0 => {
                    let quantity = line.quantity.filter(|q| *q > 0).unwrap_or(1);
                    Ok((id, line, quantity))
                }
                _ => Err(ShopError::bad_request(
                    "each product must include id, name and price",
                )),
            })
            .collect()
    }

    async fn issue_reward_coupon(&self) -> Result<Coupon, ShopError> {
        let code = format!(
            "{REWARD_CODE_PREFIX}{}",
            nanoid::nanoid!(6, &REWARD_CODE_ALPHABET)
        );
        let coupon = Coupon {
            code,
            discount_percentage: REWARD_DISCOUNT_PERCENTAGE,
            expiration_date: self.clock.now() + Duration::days(REWARD_VALIDITY_DAYS),
            is_active: true,
        };
        self.coupon_repo.insert(&coupon).await?;
        Ok(coupon)
    }
}

#[async_trait::async_trait]
impl CheckoutService for RealCheckoutService {
    async fn create_session(
        &self,
        user_id: UserId,
        lines: Vec<CheckoutLine>,
        coupon_code: Option<String>,
    ) -> Result<CheckoutSummary, ShopError> {
        let lines = Self::validate_lines(&lines)?;
        let total_cents = sum_line_totals(lines.iter().map(|(_, l, q)| (l.price_cents, *q)))?;

        let mut line_items = Vec::with_capacity(lines.len());
        let mut order_lines = Vec::with_capacity(lines.len());
        for (product_id, line, quantity) in lines {
            line_items.push(PaymentLineItem {
                name: line.name.clone(),
                images: line.image.iter().filter(|i| !i.is_empty()).cloned().collect(),
                unit_amount_cents: line.price_cents,
                quantity,
            });
            order_lines.push(OrderLine {
                product_id,
                quantity,
                price_cents: line.price_cents,
            });
        }

        let coupon = match coupon_code.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(code) => Some(
                find_usable_coupon(self.coupon_repo.as_ref(), self.clock.as_ref(), code)
                    .await
                    .map_err(|e| match e {
                        ShopError::NotFound(_) => {
                            ShopError::not_found("coupon not found or inactive")
                        }
                        other => other,
                    })?,
            ),
            None => None,
        };
        let discount_percentage = coupon.as_ref().map_or(0, |c| c.discount_percentage);
        let discounted_cents = apply_discount(total_cents, discount_percentage)?;

        let session = self
            .payment_gateway
            .create_session(PaymentSessionRequest {
                line_items,
                discount_percentage,
                success_url: self.urls.success_url.clone(),
                cancel_url: self.urls.cancel_url.clone(),
                metadata: PaymentMetadata {
                    user_id: Some(user_id),
                    coupon_code: coupon.as_ref().map(|c| c.code.clone()),
                    lines: order_lines,
                },
            })
            .await?;

        let reward_coupon_code = if discounted_cents >= REWARD_THRESHOLD_CENTS {
            let reward = self.issue_reward_coupon().await?;
            info!(%user_id, code = %reward.code, "reward coupon issued");
            Some(reward.code)
        } else {
            None
        };

        Ok(CheckoutSummary {
            session_id: session.id,
            total_before_discount_cents: total_cents,
            total_after_discount_cents: discounted_cents,
            reward_coupon_code,
        })
    }

    async fn confirm(&self, session_id: &str) -> Result<Order, ShopError> {
        if session_id.trim().is_empty() {
            return Err(ShopError::bad_request("session_id is required"));
        }
        if let Some(existing) = self.order_repo.find_by_payment_session(session_id).await? {
            return Ok(existing);
        }

        let session = self
            .payment_gateway
            .retrieve_session(session_id)
            .await?
            .ok_or_else(|| ShopError::not_found("session not found"))?;
        if !session.paid {
            return Err(ShopError::bad_request("payment not completed"));
        }

        let metadata = session.metadata;
        let subtotal_cents =
            sum_line_totals(metadata.lines.iter().map(|l| (l.price_cents, l.quantity)))?;
        let order = Order {
            id: OrderId::new(),
            user_id: metadata.user_id,
            lines: metadata.lines,
            total_cents: session.amount_total_cents,
            coupon: metadata.coupon_code,
            discount_cents: (subtotal_cents - session.amount_total_cents).max(0),
            payment_session_id: session.id,
            created_at: self.clock.now(),
        };
        self.order_repo.insert(&order).await?;

        if let Some(user_id) = order.user_id {
            self.cart_repo.clear(user_id).await?;
        }
        info!(order_id = %order.id, total_cents = order.total_cents, "order created");
        Ok(order)
    }
}
