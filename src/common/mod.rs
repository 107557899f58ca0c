// Shared types for ldgraph.

pub mod error;

pub use error::{AttributionError, CommandError, GraphError, InspectError};
