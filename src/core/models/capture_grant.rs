use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::global_constants::LOG_TAG_SESSION;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    pub width: u32,
    pub height: u32,
    pub density_dpi: u32,
}

impl DisplayMetrics {
    pub fn new(width: u32, height: u32, density_dpi: u32) -> Self {
        Self {
            width,
            height,
            density_dpi,
        }
    }

    pub fn has_area(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

#[derive(Clone)]
pub struct CaptureGrant {
    grant_id: Uuid,
    token: String,
    display: DisplayMetrics,
    revocation: watch::Receiver<bool>,
}

impl std::fmt::Debug for CaptureGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureGrant")
            .field("grant_id", &self.grant_id)
            .field("display", &self.display)
            .field("revoked", &self.is_revoked())
            .finish()
    }
}

impl CaptureGrant {
    pub fn issue(token: impl Into<String>, display: DisplayMetrics) -> (Self, GrantRevoker) {
        let grant_id = Uuid::new_v4();
        let (sender, revocation) = watch::channel(false);

        log::debug!(
            "{} issued grant {} for {}x{} @ {}dpi",
            LOG_TAG_SESSION,
            grant_id,
            display.width,
            display.height,
            display.density_dpi
        );

        (
            Self {
                grant_id,
                token: token.into(),
                display,
                revocation,
            },
            GrantRevoker { grant_id, sender },
        )
    }

    pub fn grant_id(&self) -> Uuid {
        self.grant_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn display(&self) -> DisplayMetrics {
        self.display
    }

    pub fn is_revoked(&self) -> bool {
        *self.revocation.borrow()
    }

    pub fn is_live(&self) -> bool {
        !self.is_revoked() && self.display.has_area()
    }

    // Pending forever if the revoker is dropped without revoking.
    pub async fn wait_for_revocation(&self) {
        let mut revocation = self.revocation.clone();
        if revocation.wait_for(|revoked| *revoked).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[derive(Debug)]
pub struct GrantRevoker {
    grant_id: Uuid,
    sender: watch::Sender<bool>,
}

impl GrantRevoker {
    pub fn revoke(&self) {
        let was_revoked = self.sender.send_replace(true);
        if !was_revoked {
            log::warn!("{} grant {} revoked", LOG_TAG_SESSION, self.grant_id);
        }
    }

    pub fn is_revoked(&self) -> bool {
        *self.sender.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_grant_is_live() {
        let (grant, _revoker) = CaptureGrant::issue("token", DisplayMetrics::new(1080, 2400, 420));

        assert!(grant.is_live());
        assert!(!grant.is_revoked());
        assert_eq!(grant.display().width, 1080);
        assert_eq!(grant.token(), "token");
    }

    #[test]
    fn test_revoke_invalidates_every_clone() {
        let (grant, revoker) = CaptureGrant::issue("token", DisplayMetrics::new(100, 100, 160));
        let session_copy = grant.clone();

        revoker.revoke();

        assert!(grant.is_revoked());
        assert!(session_copy.is_revoked());
        assert!(!session_copy.is_live());
        assert!(revoker.is_revoked());
    }

    #[test]
    fn test_grant_without_display_area_is_not_live() {
        let (grant, _revoker) = CaptureGrant::issue("token", DisplayMetrics::new(0, 2400, 420));

        assert!(!grant.is_live());
    }

    #[test]
    fn test_debug_output_hides_token() {
        let (grant, _revoker) = CaptureGrant::issue("secret-token", DisplayMetrics::new(1, 1, 1));

        let debug_str = format!("{:?}", grant);

        assert!(!debug_str.contains("secret-token"));
        assert!(debug_str.contains("CaptureGrant"));
    }

    #[tokio::test]
    async fn test_wait_for_revocation_resolves_after_revoke() {
        let (grant, revoker) = CaptureGrant::issue("token", DisplayMetrics::new(10, 10, 160));

        let waiter = tokio::spawn(async move { grant.wait_for_revocation().await });
        revoker.revoke();

        waiter.await.unwrap();
    }
}
