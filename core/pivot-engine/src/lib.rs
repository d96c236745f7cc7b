//! FILENAME: core/pivot-engine/src/lib.rs
//! Survey pivot subsystem.
//!
//! Turns a batch of normalized survey records into cross-tabulated counts with
//! author attribution, then into chart-ready groups.
//!
//! Layers:
//! - `definition`: Serializable configuration (families, catalog, colors, bubble axes)
//! - `cache`: Dense internal representation (interned domains, counters, attribution)
//! - `engine`: Counting passes (category x sub-domain, bubble pairs)
//! - `view`: Chart output for the frontend (groups, values, global max)

pub mod definition;
pub mod cache;
pub mod engine;
pub mod error;
pub mod view;

pub use definition::*;
pub use cache::*;
pub use error::{PivotError, TemplateAxis};
pub use engine::{aggregate, aggregate_pairs, BubblePivot, CategoryPivot};
pub use view::*;
