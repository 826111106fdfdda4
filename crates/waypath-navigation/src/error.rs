//! This module defines the error types used by the `waypath-navigation` crate.

#![warn(missing_docs)]

/// Error type for layout generation operations.
///
/// This enum encapsulates all possible errors that can occur while sampling,
/// building the layout graph or driving the generator, such as invalid
/// parameters or out-of-bounds grid access.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationError {
    /// Error for an invalid generation parameter.
    /// This variant is returned when an extent, radius, attempt count or
    /// advance threshold is zero, negative or not finite.
    InvalidParameter(&'static str),
    /// Error for out-of-bounds access.
    /// This variant is returned when attempting to access sample grid cells outside the valid range.
    OutOfBounds(&'static str),
    /// Error for a route endpoint that is not part of the point set.
    /// This variant is returned when the start or goal point has no matching graph node.
    MissingEndpoint(&'static str),
    /// Error for a generation run aborted through its cancellation flag.
    Cancelled,
}

impl core::fmt::Display for NavigationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NavigationError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            NavigationError::OutOfBounds(msg) => write!(f, "Grid access out of bounds: {}", msg),
            NavigationError::MissingEndpoint(msg) => write!(f, "Missing route endpoint: {}", msg),
            NavigationError::Cancelled => write!(f, "Generation cancelled"),
        }
    }
}

impl core::error::Error for NavigationError {}
