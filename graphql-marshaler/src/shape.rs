//! Explicit descriptions of the data a query selects.
//!
//! A type takes part in query building by implementing [`QueryShape`]. Records list
//! their fields with [`Field`] descriptors carrying the same metadata serde uses to
//! decode the response: the externally visible name, an optional requested field
//! name (producing an alias), an omit flag, and argument declarations.
use std::any::TypeId;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::marshaler::ProducesSelection;

/// Directive value dropping a field from the query.
pub const OMIT_DIRECTIVE: &str = "omit";

/// A type whose shape can be turned into a GraphQL selection set.
pub trait QueryShape {
    fn shape() -> Shape;
}

/// Builds the custom selection producer of a [`Shape::Custom`] field.
pub type SelectionFactory = Arc<dyn Fn() -> Box<dyn ProducesSelection> + Send + Sync>;

/// The structure of a type, as far as query building is concerned.
#[derive(Clone)]
#[non_exhaustive]
pub enum Shape {
    /// Text, numbers, booleans: a leaf field.
    Scalar,
    /// `Option`, `Box` and other pointers. Selected as their pointee.
    Reference(Box<Shape>),
    /// An object with an ordered list of fields.
    Record(RecordShape),
    /// A list. Selected once, through its element shape.
    Sequence(Box<Shape>),
    /// A type producing its own selections.
    Custom(SelectionFactory),
    /// A kind with no selection set representation, such as a map.
    Unsupported(&'static str),
}

impl Shape {
    /// Describes the record `T` with the given fields, in declaration order.
    pub fn record<T: 'static>(fields: impl IntoIterator<Item = Field>) -> Self {
        Shape::Record(RecordShape {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
            fields: fields.into_iter().collect(),
        })
    }

    /// Describes a type selected by a [`ProducesSelection`] built with `Default`.
    pub fn custom<T>() -> Self
    where
        T: ProducesSelection + Default + 'static,
    {
        Shape::Custom(Arc::new(|| {
            Box::new(T::default()) as Box<dyn ProducesSelection>
        }))
    }

    /// Describes a type selected by the producer `factory` returns.
    pub fn custom_with<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn ProducesSelection> + Send + Sync + 'static,
    {
        Shape::Custom(Arc::new(factory))
    }

    pub fn reference(inner: Shape) -> Self {
        Shape::Reference(Box::new(inner))
    }

    pub fn sequence(inner: Shape) -> Self {
        Shape::Sequence(Box::new(inner))
    }

    /// A short name for this kind of shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Scalar => "scalar",
            Shape::Reference(_) => "reference",
            Shape::Record(_) => "record",
            Shape::Sequence(_) => "sequence",
            Shape::Custom(_) => "custom selection",
            Shape::Unsupported(kind) => *kind,
        }
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Scalar => f.write_str("Scalar"),
            Shape::Reference(inner) => f.debug_tuple("Reference").field(inner).finish(),
            Shape::Record(record) => f.debug_tuple("Record").field(record).finish(),
            Shape::Sequence(inner) => f.debug_tuple("Sequence").field(inner).finish(),
            Shape::Custom(_) => f.write_str("Custom(..)"),
            Shape::Unsupported(kind) => f.debug_tuple("Unsupported").field(kind).finish(),
        }
    }
}

/// The fields of an object type.
#[derive(Debug, Clone)]
pub struct RecordShape {
    type_name: &'static str,
    type_id: TypeId,
    fields: Vec<Field>,
}

impl RecordShape {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }
}

/// One field of a [`RecordShape`].
///
/// The field's type is described lazily, through a function, so that a type can
/// mention itself without building an infinite description.
#[derive(Clone)]
pub struct Field {
    ident: String,
    json: Option<String>,
    gql: Option<String>,
    gql_params: Option<String>,
    shape: fn() -> Shape,
}

impl Field {
    /// A field named `ident` in Rust, of type `T`.
    pub fn of<T: QueryShape>(ident: impl Into<String>) -> Self {
        Self::with_shape(ident, T::shape)
    }

    pub fn with_shape(ident: impl Into<String>, shape: fn() -> Shape) -> Self {
        Self {
            ident: ident.into(),
            json: None,
            gql: None,
            gql_params: None,
            shape,
        }
    }

    /// Sets the externally visible name, the key the response is decoded from.
    ///
    /// Only the part before the first comma counts, so a serde style
    /// `"name,omitempty"` is accepted.
    pub fn json(mut self, name: impl Into<String>) -> Self {
        self.json = Some(name.into());
        self
    }

    /// Sets the GraphQL directive: either `omit`, or the name of the field to request.
    ///
    /// Requesting another name only takes effect together with [`Field::json`], and
    /// renders as the alias `json: gql`.
    pub fn gql(mut self, directive: impl Into<String>) -> Self {
        self.gql = Some(directive.into());
        self
    }

    /// Leaves this field out of the query.
    pub fn omit(self) -> Self {
        self.gql(OMIT_DIRECTIVE)
    }

    /// Declares the arguments this field accepts, as comma separated `name:Type`
    /// pairs, for example `"id:ID!, first:Int"`.
    pub fn params(mut self, declaration: impl Into<String>) -> Self {
        self.gql_params = Some(declaration.into());
        self
    }

    pub fn ident(&self) -> &str {
        &self.ident
    }

    pub fn shape(&self) -> Shape {
        (self.shape)()
    }

    pub fn is_omitted(&self) -> bool {
        self.gql
            .as_deref()
            .is_some_and(|gql| gql.split(',').any(|entry| entry.trim() == OMIT_DIRECTIVE))
    }

    /// The name this field is requested under, alias included.
    pub fn wire_name(&self) -> String {
        let json = self
            .json
            .as_deref()
            .map(|json| json.split(',').next().unwrap_or_default().trim());
        let gql = self
            .gql
            .as_deref()
            .map(|gql| gql.split(',').next().unwrap_or_default().trim());
        match (json, gql) {
            (Some(json), Some(gql)) => format!("{json}: {gql}"),
            (Some(json), None) => json.to_owned(),
            (None, _) => self.ident.clone(),
        }
    }

    pub(crate) fn argument_declaration(&self) -> Option<&str> {
        self.gql_params.as_deref()
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("ident", &self.ident)
            .field("json", &self.json)
            .field("gql", &self.gql)
            .field("gql_params", &self.gql_params)
            .finish_non_exhaustive()
    }
}

macro_rules! scalar_shapes {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl QueryShape for $ty {
                fn shape() -> Shape {
                    Shape::Scalar
                }
            }
        )+
    };
}

scalar_shapes!(
    String, bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32,
    f64,
);

macro_rules! reference_shapes {
    ($($ty:ident),+) => {
        $(
            impl<T: QueryShape> QueryShape for $ty<T> {
                fn shape() -> Shape {
                    Shape::reference(T::shape())
                }
            }
        )+
    };
}

reference_shapes!(Option, Box, Rc, Arc);

macro_rules! sequence_shapes {
    ($($ty:ident),+) => {
        $(
            impl<T: QueryShape> QueryShape for $ty<T> {
                fn shape() -> Shape {
                    Shape::sequence(T::shape())
                }
            }
        )+
    };
}

sequence_shapes!(Vec, VecDeque, BTreeSet);

impl<T: QueryShape, S> QueryShape for HashSet<T, S> {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }
}

impl<T: QueryShape, const N: usize> QueryShape for [T; N] {
    fn shape() -> Shape {
        Shape::sequence(T::shape())
    }
}

impl<K, V, S> QueryShape for HashMap<K, V, S> {
    fn shape() -> Shape {
        Shape::Unsupported("map")
    }
}

impl<K, V> QueryShape for BTreeMap<K, V> {
    fn shape() -> Shape {
        Shape::Unsupported("map")
    }
}

impl QueryShape for serde_json::Value {
    fn shape() -> Shape {
        Shape::Unsupported("dynamic json value")
    }
}

impl QueryShape for () {
    fn shape() -> Shape {
        Shape::Unsupported("unit")
    }
}
