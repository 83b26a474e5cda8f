use async_trait::async_trait;

use crate::errors::AisleResult;
use crate::models::UserProfile;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, session_id: &str) -> AisleResult<Option<UserProfile>>;
}
