use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::error::ClientError;
use crate::error::MarshalError;
use crate::marshaler::Marshaler;
use crate::query_part::QueryPart;
use crate::response;
use crate::response::Response;
use crate::shape::QueryShape;
use crate::transport::Transport;

/// The kind of GraphQL operation a request performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => f.write_str("query"),
            OperationKind::Mutation => f.write_str("mutation"),
        }
    }
}

/// The JSON document posted to the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub query: String,
    pub variables: Map<String, Value>,
}

/// One GraphQL round trip.
///
/// The request borrows the value it was built from: the query selects that value's
/// shape, and a successful [`Request::send`] writes the response's `data` back
/// into it.
pub struct Request<'a, T> {
    operation: OperationKind,
    target: &'a mut T,
    marshaler: Marshaler,
    variables: Map<String, Value>,
    transport: Option<Arc<dyn Transport>>,
}

impl<'a, T: QueryShape> Request<'a, T> {
    /// A `query` selecting the shape of `target`.
    pub fn query(target: &'a mut T) -> Result<Self, MarshalError> {
        Self::new(OperationKind::Query, target, Marshaler::new())
    }

    /// A `mutation` selecting the shape of `target`.
    pub fn mutation(target: &'a mut T) -> Result<Self, MarshalError> {
        Self::new(OperationKind::Mutation, target, Marshaler::new())
    }

    /// Builds the query tree of `T` with `marshaler`.
    pub fn new(
        operation: OperationKind,
        target: &'a mut T,
        mut marshaler: Marshaler,
    ) -> Result<Self, MarshalError> {
        marshaler.marshal::<T>()?;
        Ok(Self {
            operation,
            target,
            marshaler,
            variables: Map::new(),
            transport: None,
        })
    }
}

impl<'a, T> Request<'a, T> {
    /// Binds a variable. Any argument declared under that name becomes part of the
    /// operation.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.marshaler = self.marshaler.with_indent_width(indent_width);
        self
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    /// Bound variables, in binding order.
    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// The value the response will be decoded into.
    pub fn target(&self) -> &T {
        self.target
    }

    /// The complete operation text.
    ///
    /// Every bound variable marks the arguments declared under its name; the marked
    /// arguments make up the operation signature. The built tree itself is left
    /// unchanged, so repeated calls return the same text.
    pub fn query_string(&self) -> String {
        let mut root = self.marshaler.root().cloned().unwrap_or_default();
        for name in self.variables.keys() {
            root.mark_argument_needed(name);
        }
        operation_text(self.operation, &root, self.marshaler.indent_width())
    }

    pub fn body(&self) -> RequestBody {
        RequestBody {
            query: self.query_string(),
            variables: self.variables.clone(),
        }
    }

    /// Sends the request and decodes the answer into the target.
    ///
    /// Fails with [`ClientError::RemoteOperation`] when the API reports errors, even
    /// if it returned data as well. Fields left out of the query keep their value.
    pub fn send(self) -> Result<Response, ClientError>
    where
        T: Serialize + DeserializeOwned,
    {
        let transport = self.transport.clone().ok_or(ClientError::MissingTransport)?;
        let body = self.body();
        tracing::debug!(
            operation = %self.operation,
            variables = body.variables.len(),
            "sending request"
        );
        tracing::trace!(query = %body.query);

        let response = transport
            .transport(&body)
            .map_err(ClientError::Transport)?;
        response::decode_into(&response.payload, self.target)?;
        Ok(response)
    }
}

fn operation_text(operation: OperationKind, root: &QueryPart, indent_width: usize) -> String {
    let signature = root.collect_required_arguments();
    let mut text = operation.to_string();
    if !signature.is_empty() {
        text.push('(');
        text.push_str(&signature.join(", "));
        text.push(')');
    }
    text.push_str(&root.render(indent_width));
    text
}
