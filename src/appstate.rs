use std::sync::Arc;

use log::info;
use tokio::sync::Mutex;

use crate::{
    config::FailurePolicy,
    listing::Listing,
    notify::{Notifier, PushToken},
    store::RecordStore,
    workflow::FormSession,
};

/// One form screen and one listing screen sharing a store.
pub struct AppState<S, N> {
    form: Mutex<FormSession<S, N>>,
    listing: Listing<S>,
}

impl<S, N> AppState<S, N>
where
    S: RecordStore,
    N: Notifier,
{
    pub fn new(store: S, notifier: N, policy: FailurePolicy, swipe_threshold: f64) -> Self {
        let store = Arc::new(store);
        let notifier = Arc::new(notifier);

        AppState {
            form: Mutex::new(FormSession::new(store.clone(), notifier, policy)),
            listing: Listing::new(store, policy, swipe_threshold),
        }
    }

    pub fn form(&self) -> &Mutex<FormSession<S, N>> {
        &self.form
    }

    pub fn listing(&self) -> &Listing<S> {
        &self.listing
    }

    pub async fn register_push_token(&self, token: PushToken) {
        let mut form = self.form.lock().await;
        info!("push token {} registered for the form session", token.as_str());
        form.set_push_token(Some(token));
    }

    pub async fn clear_push_token(&self) {
        self.form.lock().await.set_push_token(None);
    }
}
