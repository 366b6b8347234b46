use std::sync::Arc;

use url::Url;

use crate::configuration::ClientConfiguration;
use crate::error::ConfigurationError;
use crate::error::MarshalError;
use crate::marshaler::Marshaler;
use crate::query_part::DEFAULT_INDENT_WIDTH;
use crate::request::OperationKind;
use crate::request::Request;
use crate::shape::QueryShape;
use crate::transport::SimpleHttpTransport;
use crate::transport::Transport;

/// Creates requests sharing one transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    indent_width: usize,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("indent_width", &self.indent_width)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// A client posting to `api_url` with a [`SimpleHttpTransport`].
    pub fn new(api_url: Url) -> Result<Self, ConfigurationError> {
        Ok(Self::with_transport(SimpleHttpTransport::new(api_url)?))
    }

    pub fn from_configuration(
        configuration: &ClientConfiguration,
    ) -> Result<Self, ConfigurationError> {
        let transport = SimpleHttpTransport::from_configuration(configuration)?;
        Ok(Self {
            transport: Arc::new(transport),
            indent_width: configuration.indent_width,
        })
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            indent_width: DEFAULT_INDENT_WIDTH,
        }
    }

    /// Replaces the transport used by requests created from now on.
    pub fn set_transport(&mut self, transport: impl Transport + 'static) {
        self.transport = Arc::new(transport);
    }

    /// A `query` request selecting the shape of `target`.
    pub fn query<'a, T: QueryShape>(
        &self,
        target: &'a mut T,
    ) -> Result<Request<'a, T>, MarshalError> {
        self.request(OperationKind::Query, target)
    }

    /// A `mutation` request selecting the shape of `target`.
    pub fn mutation<'a, T: QueryShape>(
        &self,
        target: &'a mut T,
    ) -> Result<Request<'a, T>, MarshalError> {
        self.request(OperationKind::Mutation, target)
    }

    fn request<'a, T: QueryShape>(
        &self,
        operation: OperationKind,
        target: &'a mut T,
    ) -> Result<Request<'a, T>, MarshalError> {
        let marshaler = Marshaler::new().with_indent_width(self.indent_width);
        Ok(Request::new(operation, target, marshaler)?
            .with_shared_transport(self.transport.clone()))
    }
}
