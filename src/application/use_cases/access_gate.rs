use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::ProfileRepository;
use crate::domain::{DomainError, Identity};

/// Where a refused visitor is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Login,
    ProfileSetup,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Login => "/login",
            Destination::ProfileSetup => "/profile-setup",
        }
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Outcome of evaluating a guard chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect(Destination),
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }
}

/// One asynchronous access predicate with a named fallback.
#[async_trait]
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;

    fn fallback(&self) -> Destination;

    async fn allows(&self, identity: Option<&Identity>) -> Result<bool, DomainError>;
}

/// Requires a signed-in identity.
pub struct RequireIdentity;

#[async_trait]
impl Guard for RequireIdentity {
    fn name(&self) -> &'static str {
        "require-identity"
    }

    fn fallback(&self) -> Destination {
        Destination::Login
    }

    async fn allows(&self, identity: Option<&Identity>) -> Result<bool, DomainError> {
        Ok(identity.is_some())
    }
}

/// Requires a profile document for the identity. Fresh lookup on every check.
pub struct RequireProfile {
    profile_repo: Arc<dyn ProfileRepository>,
}

impl RequireProfile {
    pub fn new(profile_repo: Arc<dyn ProfileRepository>) -> Self {
        Self { profile_repo }
    }
}

#[async_trait]
impl Guard for RequireProfile {
    fn name(&self) -> &'static str {
        "require-profile"
    }

    fn fallback(&self) -> Destination {
        Destination::ProfileSetup
    }

    async fn allows(&self, identity: Option<&Identity>) -> Result<bool, DomainError> {
        match identity {
            Some(identity) => Ok(self
                .profile_repo
                .find_profile(identity.uid())
                .await?
                .is_some()),
            None => Ok(false),
        }
    }
}

/// Ordered guards; the first refusal decides the redirect.
#[derive(Default)]
pub struct GuardChain {
    guards: Vec<Box<dyn Guard>>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub async fn evaluate(&self, identity: Option<&Identity>) -> Result<Access, DomainError> {
        for guard in &self.guards {
            if !guard.allows(identity).await? {
                debug!(
                    guard = guard.name(),
                    redirect = %guard.fallback(),
                    "Access refused"
                );
                return Ok(Access::Redirect(guard.fallback()));
            }
        }
        Ok(Access::Granted)
    }
}

/// Views of the chat application and the guards protecting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    ProfileSetup,
    Chat,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::ProfileSetup => "/profile-setup",
            Route::Chat => "/chat",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" => Some(Route::Home),
            "/login" => Some(Route::Login),
            "/signup" => Some(Route::Signup),
            "/profile-setup" => Some(Route::ProfileSetup),
            "/chat" => Some(Route::Chat),
            _ => None,
        }
    }

    pub fn guards(&self, profile_repo: Arc<dyn ProfileRepository>) -> GuardChain {
        match self {
            Route::Home | Route::Login | Route::Signup => GuardChain::new(),
            Route::ProfileSetup => GuardChain::new().with(RequireIdentity),
            Route::Chat => GuardChain::new()
                .with(RequireIdentity)
                .with(RequireProfile::new(profile_repo)),
        }
    }
}
