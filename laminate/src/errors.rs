// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contains types that describe errors `laminate` methods can return.
//!
//! Only graph *construction* is fallible. Laying out a well-formed graph is
//! total: degenerate inputs degrade gracefully rather than erroring (see the
//! crate-level documentation).

use std::error;
use std::fmt;

use Error::*;

/// Error type describing the sorts of errors `laminate` can return.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// An error occurred while parsing graph JSON.
    JsonParse(serde_json::Error),
    /// An error occurred while constructing a `LayoutGraph`.
    GraphConstructError(String),
    /// An internal error occurred within a `LayoutGraph`.
    GraphInternalError(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonParse(err) => write!(f, "Error while parsing graph JSON: {}", err),
            GraphConstructError(msg) => write!(f, "Error while constructing graph: {}", msg),
            GraphInternalError(msg) => write!(f, "Internal error in graph: {}", msg),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            JsonParse(err) => Some(err),
            GraphConstructError(_) => None,
            GraphInternalError(_) => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        JsonParse(err)
    }
}
