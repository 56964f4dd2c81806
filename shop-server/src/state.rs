//! Shared handler state

use std::sync::Arc;

use crate::auth::JwtService;
use crate::checkout::{CheckoutService, PaymentRouter};
use crate::db::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub checkout: CheckoutService,
    jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, payments: PaymentRouter, jwt: JwtService) -> Self {
        Self {
            checkout: CheckoutService::new(store.clone(), payments),
            store,
            jwt: Arc::new(jwt),
        }
    }

    pub fn get_jwt_service(&self) -> &JwtService {
        &self.jwt
    }
}
