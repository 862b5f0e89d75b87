//! Application module: exposes the view-state controller used by the TUI and runtime.
//!
//! The `App` model lives in `app::model`; the pure filter/search derivation
//! lives in `app::view`.

mod model;
mod view;

pub use model::*;
pub use view::*;
