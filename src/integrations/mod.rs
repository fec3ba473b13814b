//! External service integrations.

pub mod apify_client {
    pub use crate::apify_client::*;
}

pub mod provider {
    pub use crate::provider::*;
}
