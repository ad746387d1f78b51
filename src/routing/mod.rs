//! Routing module
//!
//! Provides the request path validator and the segment-tree handler registry:
//! - Path safety check applied before any lookup
//! - Exact path + method resolution to an API handler

mod path;
mod registry;

pub use path::is_valid_path;
pub use registry::{route_segments, Registry, RegistryError, RouteNode};
