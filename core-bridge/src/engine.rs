//! Engine lifecycle.
//!
//! The engine wraps the delegate compute module behind an explicit
//! lifecycle: `Uninitialized → Initializing → Ready`. It replaces the
//! original's scattering of process-wide flags (an `initCalled` boolean
//! and a module global) with one owned value that the dispatcher task
//! holds exclusively.

use std::fmt;
use std::sync::Arc;

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::module::{ModuleLoader, TunnelModule};
use tracing::info;

/// Lifecycle state of the bridge engine.
pub enum EngineState {
    /// No init has been attempted (or the last one failed).
    Uninitialized,
    /// An init is in flight: the delegate module is loading.
    Initializing,
    /// The delegate module is loaded and commands may be served.
    Ready(Arc<dyn TunnelModule>),
}

impl EngineState {
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Uninitialized => "uninitialized",
            EngineState::Initializing => "initializing",
            EngineState::Ready(_) => "ready",
        }
    }
}

impl fmt::Debug for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The process-wide engine value: lifecycle state plus the loader used to
/// boot the delegate module.
pub struct Engine {
    state: EngineState,
    loader: Arc<dyn ModuleLoader>,
}

impl Engine {
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self {
            state: EngineState::Uninitialized,
            loader,
        }
    }

    /// One-shot initialization: loads the delegate module against
    /// `endpoint` and transitions to `Ready`.
    ///
    /// Fails with [`BridgeError::AlreadyInitialized`] on any attempt after
    /// the engine has left `Uninitialized`. A load failure restores
    /// `Uninitialized`, so a failed init may be retried; a successful one
    /// is final.
    pub async fn init(&mut self, endpoint: &str) -> Result<()> {
        if !matches!(self.state, EngineState::Uninitialized) {
            return Err(BridgeError::AlreadyInitialized);
        }
        self.state = EngineState::Initializing;
        match self.loader.load(endpoint).await {
            Ok(module) => {
                self.state = EngineState::Ready(module);
                info!(endpoint, "worker initialized");
                Ok(())
            }
            Err(err) => {
                self.state = EngineState::Uninitialized;
                Err(err)
            }
        }
    }

    /// The loaded module, or [`BridgeError::NotInitialized`].
    ///
    /// Every command handler other than `init` goes through this assert.
    pub fn module(&self) -> Result<&Arc<dyn TunnelModule>> {
        match &self.state {
            EngineState::Ready(module) => Ok(module),
            _ => Err(BridgeError::NotInitialized),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, EngineState::Ready(_))
    }

    pub fn state_name(&self) -> &'static str {
        self.state.name()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .finish()
    }
}
