//! Actor identity resolution.
//!
//! The host platform may inject the current user's identity; when it
//! is absent the resolver degrades to a guest identity instead of
//! failing. Resolution always succeeds.

use crate::config::IdentityConfig;

/// Fallback actor id used when the host identity hook is absent.
pub const GUEST_ACTOR_ID: i64 = 12345;

/// Identity injected by the host platform, when available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub user_id: i64,
    pub display_name: String,
}

impl From<&IdentityConfig> for HostIdentity {
    fn from(cfg: &IdentityConfig) -> Self {
        Self {
            user_id: cfg.user_id,
            display_name: cfg.display_name.clone(),
        }
    }
}

/// The currently operating user, resolved fresh each load. Never
/// persisted as its own entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Stable for the session.
    pub id: i64,
    pub display_name: String,
    /// True when no host identity was available.
    pub is_guest: bool,
}

/// Resolve the current actor from the host identity, falling back to
/// a guest identity when the hook is absent.
pub fn resolve_actor(host: Option<&HostIdentity>) -> Actor {
    match host {
        Some(identity) => Actor {
            id: identity.user_id,
            display_name: identity.display_name.clone(),
            is_guest: false,
        },
        None => Actor {
            id: GUEST_ACTOR_ID,
            display_name: "Guest".to_string(),
            is_guest: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_from_host() {
        let host = HostIdentity {
            user_id: 777,
            display_name: "Ada Lovelace".to_string(),
        };

        let actor = resolve_actor(Some(&host));
        assert_eq!(actor.id, 777);
        assert_eq!(actor.display_name, "Ada Lovelace");
        assert!(!actor.is_guest);
    }

    #[test]
    fn test_guest_fallback() {
        let actor = resolve_actor(None);
        assert_eq!(actor.id, GUEST_ACTOR_ID);
        assert!(actor.is_guest);
    }
}
