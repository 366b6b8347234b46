//! Turns described shapes into [`QueryPart`] trees.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

#[cfg(test)]
mod tests;

use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;

use crate::error::BoxError;
use crate::error::MarshalError;
use crate::query_part::DEFAULT_INDENT_WIDTH;
use crate::query_part::QueryPart;
use crate::shape::Field;
use crate::shape::QueryShape;
use crate::shape::RecordShape;
use crate::shape::Shape;

/// A type building its own selections instead of being walked field by field.
///
/// The returned parts are added, in order, to the selection set of the field having
/// this type. Use it for hand written or computed selections.
pub trait ProducesSelection {
    fn marshal_gql(&self, marshaler: &Marshaler) -> Result<Vec<QueryPart>, BoxError>;
}

/// Builds the query tree of one request.
#[derive(Debug, Clone)]
pub struct Marshaler {
    root: Option<QueryPart>,
    indent_width: usize,
    // Fields and records entered by the walks in progress, including the ones
    // started by custom producers through `selection_of`.
    trail: RefCell<Trail>,
}

#[derive(Debug, Clone, Default)]
struct Trail {
    path: Vec<String>,
    records: Vec<TypeId>,
}

impl Default for Marshaler {
    fn default() -> Self {
        Self {
            root: None,
            indent_width: DEFAULT_INDENT_WIDTH,
            trail: RefCell::default(),
        }
    }
}

impl Marshaler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how many spaces each nesting level is indented by when rendering.
    pub fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    /// The tree built by the last successful [`Marshaler::marshal`] call.
    pub fn root(&self) -> Option<&QueryPart> {
        self.root.as_ref()
    }

    /// Builds the query tree for `T` and keeps it as this marshaler's root.
    pub fn marshal<T: QueryShape>(&mut self) -> Result<&QueryPart, MarshalError> {
        self.marshal_shape(&T::shape())
    }

    /// Builds the query tree for an explicit shape description.
    ///
    /// The shape must describe a record, possibly behind references, since only an
    /// object can carry a selection set and receive the response's `data`.
    pub fn marshal_shape(&mut self, shape: &Shape) -> Result<&QueryPart, MarshalError> {
        let record = root_record(shape)?;
        let mut root = QueryPart::new("");
        Walk::new(self).record(record, &mut root)?;

        if self.root.is_some() {
            tracing::warn!(
                type_name = record.type_name(),
                "query tree built twice, replacing the previous one"
            );
        }
        tracing::debug!(
            type_name = record.type_name(),
            fields = root.sub_fields().len(),
            "built query tree"
        );
        Ok(self.root.insert(root))
    }

    /// Builds the query tree for `T`, marks `args_to_include` as bound, and renders
    /// the selection set.
    pub fn marshal_to_graphql<T: QueryShape>(
        &mut self,
        args_to_include: &[&str],
    ) -> Result<String, MarshalError> {
        self.marshal::<T>()?;
        self.add_to_args(args_to_include);
        Ok(self.to_string())
    }

    /// Marks more arguments as bound on the built tree.
    pub fn add_to_args<I, S>(&mut self, arg_names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let Some(root) = self.root.as_mut() else {
            tracing::warn!("arguments marked before any query tree was built");
            return;
        };
        for arg_name in arg_names {
            root.mark_argument_needed(arg_name.as_ref());
        }
    }

    /// Builds the selections of `T` without touching this marshaler's root.
    ///
    /// Meant for [`ProducesSelection`] implementations embedding described types in
    /// their hand written selections. Called during a build, it continues that build's
    /// walk: a record already being walked is reported as [`MarshalError::CyclicShape`].
    pub fn selection_of<T: QueryShape>(&self) -> Result<Vec<QueryPart>, MarshalError> {
        let mut holder = QueryPart::new("");
        Walk::new(self).shape(&T::shape(), &mut holder)?;
        Ok(holder.into_sub_fields())
    }
}

impl fmt::Display for Marshaler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => root.write_selection(f, 0, self.indent_width),
            None => Ok(()),
        }
    }
}

/// Builds a fresh [`Marshaler`] holding the query tree of `T`.
pub fn marshal<T: QueryShape>() -> Result<Marshaler, MarshalError> {
    let mut marshaler = Marshaler::new();
    marshaler.marshal::<T>()?;
    Ok(marshaler)
}

fn root_record(shape: &Shape) -> Result<&RecordShape, MarshalError> {
    match shape {
        Shape::Reference(inner) => root_record(inner),
        Shape::Record(record) => Ok(record),
        other => Err(MarshalError::InvalidInputKind { kind: other.kind() }),
    }
}

/// One walk over a shape. Its position lives in the marshaler's trail.
struct Walk<'a> {
    marshaler: &'a Marshaler,
}

impl<'a> Walk<'a> {
    fn new(marshaler: &'a Marshaler) -> Self {
        Self { marshaler }
    }

    fn field_path(&self) -> String {
        self.marshaler.trail.borrow().path.join(".")
    }

    fn shape(&self, shape: &Shape, parent: &mut QueryPart) -> Result<(), MarshalError> {
        match shape {
            Shape::Reference(inner) | Shape::Sequence(inner) => self.shape(inner, parent),
            Shape::Record(record) => self.record(record, parent),
            Shape::Scalar => Ok(()),
            Shape::Custom(factory) => {
                let parts = factory()
                    .marshal_gql(self.marshaler)
                    .map_err(|err| match err.downcast::<MarshalError>() {
                        Ok(err) => *err,
                        Err(err) => MarshalError::SelectionProducer {
                            field: self.field_path(),
                            reason: err.to_string(),
                        },
                    })?;
                parent.extend_sub_fields(parts);
                Ok(())
            }
            Shape::Unsupported(kind) => Err(MarshalError::UnsupportedFieldKind {
                field: self.field_path(),
                kind: *kind,
            }),
        }
    }

    fn record(&self, record: &RecordShape, parent: &mut QueryPart) -> Result<(), MarshalError> {
        let type_id = record.type_id();
        if self.marshaler.trail.borrow().records.contains(&type_id) {
            return Err(MarshalError::CyclicShape {
                type_name: record.type_name(),
                field: self.field_path(),
            });
        }

        self.marshaler.trail.borrow_mut().records.push(type_id);
        let result = record
            .fields()
            .iter()
            .try_for_each(|field| self.field(field, parent));
        self.marshaler.trail.borrow_mut().records.pop();
        result
    }

    fn field(&self, field: &Field, parent: &mut QueryPart) -> Result<(), MarshalError> {
        if field.is_omitted() {
            tracing::trace!(field = field.ident(), "omitting field");
            return Ok(());
        }

        let mut part = QueryPart::new(field.wire_name());
        self.marshaler
            .trail
            .borrow_mut()
            .path
            .push(field.ident().to_owned());
        let result = self.populate(field, &mut part);
        self.marshaler.trail.borrow_mut().path.pop();
        result?;

        parent.push_sub_field(part);
        Ok(())
    }

    fn populate(&self, field: &Field, part: &mut QueryPart) -> Result<(), MarshalError> {
        if let Some(declaration) = field.argument_declaration() {
            for (name, ty) in parse_argument_declaration(declaration).map_err(|entry| {
                MarshalError::InvalidArgumentDeclaration {
                    field: self.field_path(),
                    declaration: entry.to_owned(),
                }
            })? {
                part.declare_argument(name, ty);
            }
        }
        self.shape(&field.shape(), part)
    }
}

/// Splits `name:Type, other:Type` into pairs. Returns the malformed entry on error.
fn parse_argument_declaration(declaration: &str) -> Result<Vec<(&str, &str)>, &str> {
    declaration
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((name, ty)) if !name.trim().is_empty() && !ty.trim().is_empty() => {
                Ok((name.trim(), ty.trim()))
            }
            _ => Err(entry),
        })
        .collect()
}
