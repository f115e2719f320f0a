//! App Context

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use rouge::storage::{FileStorage, Storage, StorageError};

use crate::{
    config::AppConfig,
    domain::carts::{CartCoordinator, CartsError, LocalCartStore, MigrationReport},
    notifications::{Notifier, TracingNotifier},
    remote::{CartsApi, CartsApiConfig, HttpCartsApi},
    session::{AccessToken, Session, SessionError, load_session, save_session},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to open storage")]
    Storage(#[source] StorageError),

    #[error("failed to load guest cart")]
    Carts(#[source] CartsError),
}

#[derive(Clone)]
pub struct AppContext {
    pub storage: Arc<dyn Storage>,
    pub carts: Arc<CartCoordinator>,
}

impl AppContext {
    /// Build application context from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the storage directory can't be opened or the
    /// guest cart can't be read.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppInitError> {
        let storage =
            FileStorage::open(&config.storage.storage_dir).map_err(AppInitError::Storage)?;

        Self::new(
            Arc::new(storage),
            Arc::new(HttpCartsApi::new(CartsApiConfig::from(&config.api))),
            Arc::new(TracingNotifier),
        )
    }

    /// Build application context from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error when the guest cart can't be read.
    pub fn new(
        storage: Arc<dyn Storage>,
        api: Arc<dyn CartsApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppInitError> {
        let local = LocalCartStore::load(Arc::clone(&storage)).map_err(AppInitError::Carts)?;

        Ok(Self {
            storage,
            carts: Arc::new(CartCoordinator::new(Arc::new(local), api, notifier)),
        })
    }

    /// Activate the persisted session, or the guest session when none is stored.
    ///
    /// # Errors
    ///
    /// Returns an error when the session can't be read.
    pub async fn resume(&self) -> Result<Session, SessionError> {
        let session = load_session(self.storage.as_ref())?;

        self.carts.set_session(session.clone()).await;

        Ok(session)
    }

    /// Log in with `token`, moving any guest items to the customer cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the session can't be persisted.
    pub async fn login(
        &self,
        token: AccessToken,
    ) -> Result<Option<MigrationReport>, SessionError> {
        let session = Session::Authenticated(token);

        let report = self.carts.set_session(session.clone()).await;

        save_session(self.storage.as_ref(), &session)?;

        info!("logged in");

        Ok(report)
    }

    /// Log out and fall back to an empty guest cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the session can't be persisted.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.carts.set_session(Session::Guest).await;

        save_session(self.storage.as_ref(), &Session::Guest)?;

        info!("logged out");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rouge::prelude::*;
    use testresult::TestResult;

    use crate::{
        config::{
            api::ApiConfig,
            logging::{LogFormat, LoggingConfig},
            storage::StorageConfig,
        },
        notifications::MockNotifier,
        remote::MockCartsApi,
        session::{CoordinatorState, SESSION_KEY},
    };

    use super::*;

    fn lipstick() -> TestResult<NewCartItem> {
        Ok(NewCartItem {
            sku: Sku::new("LIP-RED")?,
            quantity: Quantity::new(2)?,
            price: Price::from_units(100),
            name: Some("Rouge Velours".to_string()),
        })
    }

    #[tokio::test]
    async fn from_config_keeps_guest_cart_in_storage_dir() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = AppConfig {
            api: ApiConfig {
                api_url: "http://localhost:8080/api".to_string(),
            },
            storage: StorageConfig {
                storage_dir: dir.path().join("rouge"),
            },
            logging: LoggingConfig {
                log_level: "info".to_string(),
                log_format: LogFormat::Compact,
            },
        };

        let context = AppContext::from_config(&config)?;

        context.resume().await?;
        context.carts.add_item(lipstick()?).await?;

        let reopened = AppContext::from_config(&config)?;

        reopened.resume().await?;

        let cart = reopened.carts.cart().await?;

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.total(), Price::from_units(200));

        Ok(())
    }

    #[tokio::test]
    async fn resume_without_stored_session_is_guest() -> TestResult {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let context = AppContext::new(
            storage,
            Arc::new(MockCartsApi::new()),
            Arc::new(MockNotifier::new()),
        )?;

        assert_eq!(context.resume().await?, Session::Guest);
        assert_eq!(context.carts.state(), CoordinatorState::Guest);

        Ok(())
    }

    #[tokio::test]
    async fn login_migrates_and_persists_session() -> TestResult {
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());

        let guest = AppContext::new(
            Arc::clone(&storage),
            Arc::new(MockCartsApi::new()),
            Arc::new(MockNotifier::new()),
        )?;

        guest.resume().await?;
        guest.carts.add_item(lipstick()?).await?;

        let mut api = MockCartsApi::new();

        api.expect_create_item()
            .once()
            .withf(|_, sku, quantity| sku.as_str() == "LIP-RED" && quantity.get() == 2)
            .returning(|_, _, _| Ok(()));
        api.expect_fetch_cart().returning(|_| Ok(Cart::new()));

        let context = AppContext::new(
            Arc::clone(&storage),
            Arc::new(api),
            Arc::new(MockNotifier::new()),
        )?;

        context.resume().await?;

        let report = context.login(AccessToken::new("t0k3n")).await?;

        assert!(report.is_some_and(|report| report.is_complete()));
        assert_eq!(storage.get(GUEST_CART_KEY)?, None);
        assert_eq!(
            load_session(storage.as_ref())?,
            Session::Authenticated(AccessToken::new("t0k3n"))
        );

        context.logout().await?;

        assert_eq!(storage.get(SESSION_KEY)?, None);
        assert!(context.carts.cart().await?.is_empty());

        Ok(())
    }
}
