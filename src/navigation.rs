//! Navigation service — side-effecting calls that leave the wizard.

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Where a navigation call sends the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// Save & Exit — leave the wizard mid-flow.
    Exit,
    /// Finish — the wizard's terminal destination.
    Dashboard,
}

/// Fire-and-forget navigation sink. No return value is consumed.
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn exit_wizard(&self);
    async fn go_to_dashboard(&self);
}

/// Navigator that records the last destination so the REST layer can
/// surface it as a redirect target.
pub struct RedirectNavigator {
    dashboard_path: String,
    last: RwLock<Option<Destination>>,
}

impl RedirectNavigator {
    pub fn new(dashboard_path: impl Into<String>) -> Self {
        Self {
            dashboard_path: dashboard_path.into(),
            last: RwLock::new(None),
        }
    }

    /// The redirect path for the most recent navigation, if any.
    pub async fn redirect_path(&self) -> Option<String> {
        (*self.last.read().await).map(|_| self.dashboard_path.clone())
    }

    pub async fn last_destination(&self) -> Option<Destination> {
        *self.last.read().await
    }
}

impl Default for RedirectNavigator {
    fn default() -> Self {
        Self::new("/dashboard")
    }
}

#[async_trait]
impl Navigator for RedirectNavigator {
    async fn exit_wizard(&self) {
        tracing::info!("Exiting profile setup wizard");
        *self.last.write().await = Some(Destination::Exit);
    }

    async fn go_to_dashboard(&self) {
        tracing::info!("Profile setup finished, going to dashboard");
        *self.last.write().await = Some(Destination::Dashboard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_last_destination() {
        let nav = RedirectNavigator::default();
        assert!(nav.last_destination().await.is_none());
        assert!(nav.redirect_path().await.is_none());

        nav.exit_wizard().await;
        assert_eq!(nav.last_destination().await, Some(Destination::Exit));

        nav.go_to_dashboard().await;
        assert_eq!(nav.last_destination().await, Some(Destination::Dashboard));
        assert_eq!(nav.redirect_path().await.as_deref(), Some("/dashboard"));
    }
}
