//! Configuration loading and projection for the event exporter service.
//!
//! A service section is decoded into JSON shapes whose fields are all
//! optional, then overlaid on the resolved config: present keys replace,
//! absent keys inherit. Exporter fragments are overlaid on a default
//! exporter (or on the exporter already holding their id), their field
//! templates compiled and their connector options merged family by family.
//!
//! Resolved configs are never mutated once published; see [`EesCfgHandle`].

pub mod cache;
pub mod exporter;
pub mod handle;
pub mod opts;
pub mod service;

pub use cache::{CacheParamCfg, CacheParamJsonCfg};
pub use exporter::{EventExporterCfg, EventExporterJsonCfg};
pub use handle::EesCfgHandle;
pub use opts::{EventExporterOpts, EventExporterOptsJson};
pub use service::{EesCfg, EesJsonCfg};
