//! Marshaling and client errors.
use displaydoc::Display;
use thiserror::Error;

use crate::response::GraphQLError;

/// Opaque error produced by a [`Transport`](crate::Transport) or a
/// [`ProducesSelection`](crate::ProducesSelection) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while turning a [`Shape`](crate::Shape) into a query tree.
///
/// Any of these aborts the whole build: a partially built tree is never kept.
#[derive(Error, Display, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MarshalError {
    /// the root of an operation must describe an object, found {kind}
    InvalidInputKind {
        /// The kind of shape found at the root.
        kind: &'static str,
    },

    /// field '{field}' has a kind that cannot be selected: {kind}
    UnsupportedFieldKind {
        /// Dotted path of the offending field.
        field: String,
        /// The kind of shape found for that field.
        kind: &'static str,
    },

    /// field '{field}' declares a malformed argument: '{declaration}'
    InvalidArgumentDeclaration {
        /// Dotted path of the offending field.
        field: String,
        /// The entry that is not a `name:Type` pair.
        declaration: String,
    },

    /// type '{type_name}' refers back to itself through field '{field}'
    CyclicShape {
        /// The record type that was entered twice.
        type_name: &'static str,
        /// Dotted path of the field closing the cycle.
        field: String,
    },

    /// custom selection for field '{field}' failed: {reason}
    SelectionProducer {
        /// Dotted path of the field with the custom selection.
        field: String,
        /// The producer's error message.
        reason: String,
    },
}

/// Errors raised during a request round trip.
#[derive(Error, Display, Debug)]
#[ignore_extra_doc_attributes]
#[non_exhaustive]
pub enum ClientError {
    /// {0}
    Marshal(#[from] MarshalError),

    /// graphql: {message}
    ///
    /// The server answered, but reported errors for the operation. Only the first
    /// message is displayed; the complete list is kept in `errors`.
    RemoteOperation {
        /// Message of the first reported error.
        message: String,
        /// Every error of the response.
        errors: Vec<GraphQLError>,
    },

    /// {0}
    Transport(BoxError),

    /// response was malformed: {reason}
    MalformedResponse {
        /// The reason the payload could not be decoded.
        reason: String,
    },

    /// the decode target could not be encoded: {reason}
    InvalidTarget {
        /// Why the target could not be turned into JSON before merging.
        reason: String,
    },

    /// no transport was set for this request
    MissingTransport,
}

/// Errors raised while loading a [`ClientConfiguration`](crate::ClientConfiguration).
#[derive(Error, Display, Debug)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// could not parse configuration: {0}
    InvalidYaml(#[from] serde_yaml::Error),

    /// could not build the http client: {0}
    HttpClient(#[from] reqwest::Error),
}
