use tracing::{info, warn};
use uuid::Uuid;

use crate::error::DashboardError;

const PLACEHOLDER_USER: &str = "adm";
const PLACEHOLDER_PASSWORD: &str = "adm";

/// Per-run session context passed to the dashboard.
///
/// The login check is a hardcoded placeholder, not an access control. The
/// aggregation code never sees this type.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    logged_in: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            logged_in: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn login(&mut self, username: &str, password: &str) -> bool {
        self.logged_in = username == PLACEHOLDER_USER && password == PLACEHOLDER_PASSWORD;
        if self.logged_in {
            info!(session = %self.id, "session logged in");
        } else {
            warn!(session = %self.id, "rejected login attempt");
        }
        self.logged_in
    }

    pub fn logout(&mut self) {
        self.logged_in = false;
        info!(session = %self.id, "session logged out");
    }

    pub fn require_login(&self) -> Result<(), DashboardError> {
        if self.logged_in {
            Ok(())
        } else {
            Err(DashboardError::NotLoggedIn)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_placeholder_credentials() {
        let mut session = Session::new();
        assert!(!session.login("adm", "wrong"));
        assert_eq!(session.require_login(), Err(DashboardError::NotLoggedIn));
        assert!(session.login("adm", "adm"));
        assert!(session.require_login().is_ok());
    }

    #[test]
    fn logout_clears_flag() {
        let mut session = Session::new();
        session.login("adm", "adm");
        session.logout();
        assert_eq!(session.require_login(), Err(DashboardError::NotLoggedIn));
    }

    #[test]
    fn sessions_get_distinct_ids() {
        assert_ne!(Session::new().id(), Session::new().id());
    }
}
