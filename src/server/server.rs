use crate::api::v1::CookiePolicy;
use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use sqlx::MySqlPool;
use std::sync::Arc;

/// The storage and gateway adapters a `Server` is assembled from.
pub struct Adapters {
    pub user_repo: Arc<dyn UserRepo>,
    pub product_repo: Arc<dyn ProductRepo>,
    pub cart_repo: Arc<dyn CartRepo>,
    pub coupon_repo: Arc<dyn CouponRepo>,
    pub order_repo: Arc<dyn OrderRepo>,
    pub refresh_store: Arc<dyn RefreshTokenStore>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub clock: Arc<dyn Clock>,
}

impl Adapters {
    /// Every port backed by process memory.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Adapters {
            user_repo: Arc::new(MemoryUserRepo::new()),
            product_repo: Arc::new(MemoryProductRepo::new()),
            cart_repo: Arc::new(MemoryCartRepo::new()),
            coupon_repo: Arc::new(MemoryCouponRepo::new()),
            order_repo: Arc::new(MemoryOrderRepo::new()),
            refresh_store: Arc::new(MemoryRefreshTokenStore::new(clock.clone())),
            payment_gateway: Arc::new(FakePaymentGateway::new()),
            clock,
        }
    }
}

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pub product_service: Arc<dyn ProductService>,
    pub cart_service: Arc<dyn CartService>,
    pub coupon_service: Arc<dyn CouponService>,
    pub checkout_service: Arc<dyn CheckoutService>,
    pub analytics_service: Arc<dyn AnalyticsService>,
    pub clock: Arc<dyn Clock>,
    pub cookie_policy: Arc<CookiePolicy>,
    pool: Option<MySqlPool>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        // missing or shared secrets must stop start-up
        let keys = SigningKeys::from_env()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let mut adapters = Adapters::in_memory(clock.clone());
        let mut pool = None;

        match settings.storage.backend.as_str() {
            "memory" => {}
            "mysql" => {
                let dsn = settings
                    .storage
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("storage.mysql_dsn is required for mysql"))?;
                let mysql = MySqlPool::connect(dsn).await?;
                adapters.user_repo = Arc::new(MySqlUserRepo::new(mysql.clone()));
                adapters.product_repo = Arc::new(MySqlProductRepo::new(mysql.clone()));
                adapters.cart_repo = Arc::new(MySqlCartRepo::new(mysql.clone()));
                adapters.coupon_repo = Arc::new(MySqlCouponRepo::new(mysql.clone()));
                adapters.order_repo = Arc::new(MySqlOrderRepo::new(mysql.clone()));
                pool = Some(mysql);
            }
            other => return Err(anyhow::anyhow!("Unknown storage backend: {}", other)),
        }

        match settings.auth.session_store.as_str() {
            "memory" => {}
            "redis" => {
                let dsn = settings
                    .auth
                    .redis_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("auth.redis_dsn is required for redis"))?;
                let redis_client = redis::Client::open(dsn)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                adapters.refresh_store = Arc::new(RedisRefreshTokenStore::new(
                    redis_manager,
                    settings.auth.key_prefix.clone(),
                ));
            }
            other => return Err(anyhow::anyhow!("Unknown session store: {}", other)),
        }

        match settings.payment.backend.as_str() {
            "fake" => {}
            other => return Err(anyhow::anyhow!("Unknown payment backend: {}", other)),
        }

        let jwt = JwtConfig {
            issuer: settings.auth.issuer.clone(),
            audience: settings.auth.audience.clone(),
            access_ttl: settings.auth.access_ttl(),
            refresh_ttl: settings.auth.refresh_ttl(),
        };
        let cookie_policy = CookiePolicy::new(
            settings.http.secure_cookies,
            settings.auth.access_ttl(),
            settings.auth.refresh_ttl(),
        );

        let mut server = Self::assemble(
            adapters,
            jwt,
            keys,
            cookie_policy,
            &settings.payment.client_url,
        );
        server.pool = pool;

        info!(
            storage = %settings.storage.backend,
            session_store = %settings.auth.session_store,
            "server started"
        );
        Ok(server)
    }

    pub fn assemble(
        adapters: Adapters,
        jwt: JwtConfig,
        keys: SigningKeys,
        cookie_policy: CookiePolicy,
        client_url: &str,
    ) -> Self {
        let Adapters {
            user_repo,
            product_repo,
            cart_repo,
            coupon_repo,
            order_repo,
            refresh_store,
            payment_gateway,
            clock,
        } = adapters;

        let issuer: Arc<dyn CredentialIssuer> =
            Arc::new(JwtCredentialIssuer::new(jwt, keys, clock.clone()));
        let credential_hasher: Arc<dyn CredentialHasher> =
            Arc::new(Argon2PasswordHasher::default());

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            user_repo.clone(),
            credential_hasher,
            issuer,
            refresh_store,
            clock.clone(),
        ));
        let product_service: Arc<dyn ProductService> =
            Arc::new(RealProductService::new(product_repo.clone()));
        let cart_service: Arc<dyn CartService> = Arc::new(RealCartService::new(
            cart_repo.clone(),
            product_repo.clone(),
        ));
        let coupon_service: Arc<dyn CouponService> =
            Arc::new(RealCouponService::new(coupon_repo.clone(), clock.clone()));
        let checkout_service: Arc<dyn CheckoutService> = Arc::new(RealCheckoutService::new(
            payment_gateway,
            coupon_repo,
            order_repo.clone(),
            cart_repo,
            clock.clone(),
            CheckoutUrls::for_client(client_url),
        ));
        let analytics_service: Arc<dyn AnalyticsService> = Arc::new(RealAnalyticsService::new(
            user_repo,
            product_repo,
            order_repo,
        ));

        Self {
            auth_service,
            product_service,
            cart_service,
            coupon_service,
            checkout_service,
            analytics_service,
            clock,
            cookie_policy: Arc::new(cookie_policy),
            pool: None,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
