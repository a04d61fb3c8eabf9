//! Publishing a resolved service config to concurrent readers.

use std::sync::{Arc, PoisonError, RwLock};

use eventex_core::Result;
use eventex_templates::TemplateRegistry;
use tracing::info;

use crate::exporter::EventExporterCfg;
use crate::service::{EesCfg, EesJsonCfg};

/// Holds the current [`EesCfg`] behind a single reference swap.
///
/// Readers take a [`snapshot`](Self::snapshot) and keep it as long as they
/// like; a reload never mutates a published config, it builds a new one and
/// swaps it in.
pub struct EesCfgHandle {
    current: RwLock<Arc<EesCfg>>,
}

impl EesCfgHandle {
    pub fn new(cfg: EesCfg) -> Self {
        Self {
            current: RwLock::new(Arc::new(cfg)),
        }
    }

    /// The currently published config.
    pub fn snapshot(&self) -> Arc<EesCfg> {
        // the guarded value is a plain Arc, a poisoned lock still holds a valid one
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Load `json` over a copy of the current config and publish it.
    ///
    /// The write lock is held for the load so concurrent reloads apply in
    /// sequence. On error nothing is published.
    pub fn reload(
        &self,
        json: &EesJsonCfg,
        registry: &TemplateRegistry,
        sep: &str,
        default_exporter: &EventExporterCfg,
    ) -> Result<Arc<EesCfg>> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = EesCfg::clone(&guard);
        next.load_from_json(json, registry, sep, default_exporter)?;
        let next = Arc::new(next);
        *guard = Arc::clone(&next);
        info!(exporters = next.exporters.len(), "exporter config reloaded");
        Ok(next)
    }

    /// Replace the published config outright.
    pub fn publish(&self, cfg: EesCfg) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(cfg);
    }
}

impl std::fmt::Debug for EesCfgHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EesCfgHandle")
            .field("current", &self.snapshot())
            .finish()
    }
}
