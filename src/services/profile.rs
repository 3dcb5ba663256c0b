use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{error, info};

use crate::error::RemoteError;
use crate::models::{Profile, ProfilePatch, Session};
use crate::notify::Notifier;
use crate::remote::CollectionClient;

/// Shown while no profile is loaded, or when loading it failed.
pub const PLACEHOLDER_NAME: &str = "User";

pub struct ProfileView {
    client: Arc<dyn CollectionClient>,
    notifier: Notifier,
    profile: RwLock<Option<Profile>>,
}

impl ProfileView {
    pub fn new(client: Arc<dyn CollectionClient>, notifier: Notifier) -> Self {
        Self {
            client,
            notifier,
            profile: RwLock::new(None),
        }
    }

    /// Loads the profile. Failures are only logged; the view keeps whatever
    /// it had and the header falls back to the placeholder.
    pub async fn load(&self, session: &Session) -> Option<Profile> {
        match self.client.get_profile(session).await {
            Ok(profile) => {
                *self.profile.write() = Some(profile.clone());
                Some(profile)
            }
            Err(e) => {
                error!("failed to load profile for {}: {}", session.user_id, e);
                None
            }
        }
    }

    pub fn current(&self) -> Option<Profile> {
        self.profile.read().clone()
    }

    pub fn display_name(&self) -> String {
        let profile = self.profile.read();
        match profile.as_ref() {
            Some(p) if !p.display_name().is_empty() => p.display_name(),
            Some(p) if !p.email.is_empty() => p.email.clone(),
            _ => PLACEHOLDER_NAME.to_string(),
        }
    }

    /// Saves the patch, then re-reads the profile from the backend.
    pub async fn update(&self, session: &Session, patch: &ProfilePatch) -> Result<(), RemoteError> {
        if let Err(e) = self.client.update_profile(session, patch).await {
            tracing::warn!("failed to update profile: {}", e);
            self.notifier.error(e.message.clone());
            return Err(e);
        }
        info!("profile for {} updated", session.user_id);
        self.notifier.success("Profile updated");
        self.load(session).await;
        Ok(())
    }
}
