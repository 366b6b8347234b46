//! Builds GraphQL operations from described Rust types and decodes the answers back
//! into them.
//!
//! A type implementing [`QueryShape`] is walked into a [`QueryPart`] tree. Binding
//! variables on a [`Request`] activates the arguments declared on its fields, and
//! [`Request::send`] posts the operation through a [`Transport`].

#![warn(unreachable_pub)]

mod client;
mod configuration;
pub mod error;
mod marshaler;
mod query_part;
mod request;
mod response;
mod shape;
mod transport;

pub use client::Client;
pub use configuration::ClientConfiguration;
pub use error::BoxError;
pub use error::ClientError;
pub use error::ConfigurationError;
pub use error::MarshalError;
pub use marshaler::Marshaler;
pub use marshaler::ProducesSelection;
pub use marshaler::marshal;
pub use query_part::DEFAULT_INDENT_WIDTH;
pub use query_part::QueryPart;
pub use request::OperationKind;
pub use request::Request;
pub use request::RequestBody;
pub use response::GraphQLError;
pub use response::Location;
pub use response::Response;
pub use shape::Field;
pub use shape::OMIT_DIRECTIVE;
pub use shape::QueryShape;
pub use shape::RecordShape;
pub use shape::SelectionFactory;
pub use shape::Shape;
pub use transport::SimpleHttpTransport;
pub use transport::Transport;
