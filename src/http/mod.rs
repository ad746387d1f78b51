//! HTTP protocol layer module
//!
//! Content-Type lookup and response builders, independent of routing.

pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response,
    build_api_response, build_file_response, full_body,
};
