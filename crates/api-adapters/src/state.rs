use std::sync::Arc;

use domains::TokenService;
use services::{AccountService, PostService, ProfileService};

use crate::metrics::Metrics;

/// Shared by every handler; cloning is cheap since each service only holds
/// `Arc`s to its ports.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub profiles: ProfileService,
    pub posts: PostService,
    pub tokens: Arc<dyn TokenService>,
    pub metrics: Arc<Metrics>,
}
