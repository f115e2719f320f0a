//! Cart reconciliation.
//!
//! [`CartCoordinator`] fronts whichever store is authoritative for the current
//! [`Session`] and copies the guest cart into the customer's remote cart when a
//! guest logs in.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, watch};
use tracing::{debug, info, warn};

use rouge::prelude::*;

use crate::{
    domain::carts::{errors::CartsError, remote::RemoteCartStore, service::CartStore},
    notifications::{Notice, Notifier},
    remote::CartsApi,
    session::{AccessToken, CoordinatorState, Session},
};

/// Outcome of copying a guest cart into a remote cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Lines the remote cart accepted.
    pub migrated: Vec<Sku>,

    /// Lines the remote cart rejected. They are gone from the guest cart too.
    pub failed: Vec<Sku>,
}

impl MigrationReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

enum Active {
    None,
    Local,
    Remote(Arc<RemoteCartStore>),
}

pub struct CartCoordinator {
    local: Arc<dyn CartStore>,
    api: Arc<dyn CartsApi>,
    notifier: Arc<dyn Notifier>,
    session: Mutex<Session>,
    active: RwLock<Active>,
    state: watch::Sender<CoordinatorState>,
}

impl CartCoordinator {
    #[must_use]
    pub fn new(
        local: Arc<dyn CartStore>,
        api: Arc<dyn CartsApi>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state, _) = watch::channel(CoordinatorState::Unknown);

        Self {
            local,
            api,
            notifier,
            session: Mutex::new(Session::Unknown),
            active: RwLock::new(Active::None),
            state,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        *self.state.borrow()
    }

    /// Watch state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CoordinatorState> {
        self.state.subscribe()
    }

    /// Switch to the store matching `session`.
    ///
    /// Moving from guest to authenticated copies every guest line into the
    /// remote cart and then empties the guest cart, whether or not each copy
    /// succeeded. Logging out does not bring the guest cart back.
    ///
    /// Transitions are serialized, so concurrent calls can't run the copy twice.
    pub async fn set_session(&self, next: Session) -> Option<MigrationReport> {
        let mut session = self.session.lock().await;

        if *session == next {
            return None;
        }

        info!(from = %self.state(), to = ?session_kind(&next), "cart session changed");

        let report = match (&*session, &next) {
            (_, Session::Unknown) => {
                *self.active.write().await = Active::None;
                self.state.send_replace(CoordinatorState::Unknown);

                None
            }
            (_, Session::Guest) => {
                *self.active.write().await = Active::Local;
                self.state.send_replace(CoordinatorState::Guest);

                None
            }
            (Session::Guest, Session::Authenticated(token)) => Some(self.migrate(token).await),
            (Session::Unknown | Session::Authenticated(_), Session::Authenticated(token)) => {
                let remote = self.connect(token);

                *self.active.write().await = Active::Remote(Arc::clone(&remote));
                self.state.send_replace(CoordinatorState::Authenticated);

                self.prefetch(&remote).await;

                None
            }
        };

        *session = next;

        report
    }

    /// The active cart.
    ///
    /// # Errors
    ///
    /// Fails before a session is set, or when the backing store can't be read.
    pub async fn cart(&self) -> Result<Cart, CartsError> {
        let store = self.store().await?;

        self.reported("load your cart", store.cart().await)
    }

    /// Is a cart request in flight?
    #[must_use]
    pub fn is_loading(&self) -> bool {
        if self.state() == CoordinatorState::Migrating {
            return true;
        }

        match self.active.try_read() {
            Ok(active) => match &*active {
                Active::None => false,
                Active::Local => self.local.is_loading(),
                Active::Remote(remote) => remote.is_loading(),
            },
            Err(_) => true,
        }
    }

    /// Add an item to the active cart.
    ///
    /// # Errors
    ///
    /// Fails before a session is set, or when the store rejects the item. The
    /// visitor is notified of store failures.
    pub async fn add_item(&self, item: NewCartItem) -> Result<Cart, CartsError> {
        let store = self.store().await?;

        debug!(sku = %item.sku, quantity = %item.quantity, "adding cart item");

        self.reported("add the item to your cart", store.add_item(item).await)
    }

    /// Set a line's quantity; zero or negative removes the line.
    ///
    /// # Errors
    ///
    /// Fails before a session is set, or when the store rejects the update.
    pub async fn update_item(&self, id: &ItemId, quantity: i64) -> Result<Cart, CartsError> {
        let store = self.store().await?;

        debug!(%id, quantity, "updating cart item");

        self.reported("update your cart", store.update_item(id, quantity).await)
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Fails before a session is set, or when the store rejects the removal.
    pub async fn remove_item(&self, id: &ItemId) -> Result<Cart, CartsError> {
        let store = self.store().await?;

        debug!(%id, "removing cart item");

        self.reported("remove the item from your cart", store.remove_item(id).await)
    }

    /// Empty the active cart, e.g. once checkout has completed.
    ///
    /// # Errors
    ///
    /// Fails before a session is set, or when the store can't be emptied.
    pub async fn clear(&self) -> Result<(), CartsError> {
        let store = self.store().await?;

        self.reported("empty your cart", store.clear().await)
    }

    async fn store(&self) -> Result<Arc<dyn CartStore>, CartsError> {
        match &*self.active.read().await {
            Active::None => Err(CartsError::SessionUnresolved),
            Active::Local => Ok(Arc::clone(&self.local)),
            Active::Remote(remote) => Ok(Arc::clone(remote) as Arc<dyn CartStore>),
        }
    }

    fn connect(&self, token: &AccessToken) -> Arc<RemoteCartStore> {
        Arc::new(RemoteCartStore::new(Arc::clone(&self.api), token.clone()))
    }

    async fn prefetch(&self, remote: &RemoteCartStore) {
        if let Err(error) = remote.refresh().await {
            warn!(%error, "failed to fetch remote cart");

            self.notifier
                .notify(Notice::error("We couldn't load your cart. Please try again."));
        }
    }

    async fn migrate(&self, token: &AccessToken) -> MigrationReport {
        // Held for the whole copy so cart operations wait for the remote cart.
        let mut active = self.active.write().await;

        self.state.send_replace(CoordinatorState::Migrating);

        let remote = self.connect(token);
        let mut report = MigrationReport::default();

        let guest = match self.local.cart().await {
            Ok(cart) => cart,
            Err(error) => {
                warn!(%error, "failed to read guest cart; nothing to migrate");

                Cart::new()
            }
        };

        for item in guest.items() {
            match remote.push_item(item.sku(), item.quantity()).await {
                Ok(()) => report.migrated.push(item.sku().clone()),
                Err(error) => {
                    warn!(sku = %item.sku(), quantity = %item.quantity(), %error, "failed to migrate guest cart item");

                    report.failed.push(item.sku().clone());
                }
            }
        }

        if let Err(error) = self.local.clear().await {
            warn!(%error, "failed to clear guest cart after migration");
        }

        info!(
            migrated = report.migrated.len(),
            failed = report.failed.len(),
            "guest cart migrated"
        );

        if !report.is_complete() {
            self.notifier.notify(Notice::warning(format!(
                "{} item(s) from your guest cart couldn't be added to your account.",
                report.failed.len()
            )));
        }

        *active = Active::Remote(Arc::clone(&remote));
        self.state.send_replace(CoordinatorState::Authenticated);

        drop(active);

        self.prefetch(&remote).await;

        report
    }

    fn reported<T>(&self, action: &str, result: Result<T, CartsError>) -> Result<T, CartsError> {
        if let Err(error) = &result {
            warn!(%error, action, "cart operation failed");

            self.notifier
                .notify(Notice::error(format!("We couldn't {action}. Please try again.")));
        }

        result
    }
}

fn session_kind(session: &Session) -> CoordinatorState {
    match session {
        Session::Unknown => CoordinatorState::Unknown,
        Session::Guest => CoordinatorState::Guest,
        Session::Authenticated(_) => CoordinatorState::Authenticated,
    }
}
