//! Record store: source loading and the dataset registry
//!
//! ```text
//!  {data_dir}/{file}.csv | .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse rows, unify nulls, canonicalise identifiers
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ registry │  key → Arc<Dataset>, loaded once, read-only after
//!   └──────────┘
//! ```

pub mod loader;
pub mod record;
pub mod registry;

pub use loader::LoadError;
pub use record::{Dataset, DatasetKey, DatasetSummary, Record};
pub use registry::{DatasetRegistry, DatasetSource};
