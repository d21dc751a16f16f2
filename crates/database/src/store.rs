//! [`ProfileStore`] backed by the SQLite profiles table.

use console_core::{async_trait, ConsoleError, ProfileStore, ProfileUpdate, UserProfile};

use crate::error::DatabaseError;
use crate::{profile, Database};

#[async_trait]
impl ProfileStore for Database {
    async fn get(&self, user_id: &str) -> Result<UserProfile, ConsoleError> {
        let document = profile::get_document(self.pool(), user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "profile",
                id: user_id.to_string(),
            })?;

        let mut profile: UserProfile =
            serde_json::from_value(document).map_err(DatabaseError::from)?;
        profile.user_id = user_id.to_string();
        Ok(profile)
    }

    async fn merge(&self, user_id: &str, update: ProfileUpdate) -> Result<(), ConsoleError> {
        if update.is_empty() {
            return Ok(());
        }
        profile::merge_document(self.pool(), user_id, update.into_document()).await?;
        Ok(())
    }

    async fn exists(&self, user_id: &str) -> Result<bool, ConsoleError> {
        Ok(profile::profile_exists(self.pool(), user_id).await?)
    }
}
