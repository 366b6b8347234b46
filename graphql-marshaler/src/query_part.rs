use std::fmt;
use std::fmt::Write;

use indexmap::IndexMap;

/// Indentation step used when no other width is configured.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// One selection of a GraphQL operation: a field, possibly with arguments and a
/// nested selection set.
///
/// The root of a tree has an empty name and only contributes its braces and
/// sub fields when rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPart {
    name: String,
    arguments: IndexMap<String, String>,
    required_arguments: Vec<String>,
    sub_fields: Vec<QueryPart>,
}

impl QueryPart {
    /// Creates a selection with no arguments and no sub fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds `sub_fields` at the end of this selection set.
    pub fn with_sub_fields(mut self, sub_fields: impl IntoIterator<Item = QueryPart>) -> Self {
        self.sub_fields.extend(sub_fields);
        self
    }

    /// Declares an argument this field accepts, with its GraphQL type.
    pub fn with_argument(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.declare_argument(name, ty);
        self
    }

    /// The wire name of this field, alias included.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared arguments, mapping the argument name to its GraphQL type.
    pub fn arguments(&self) -> &IndexMap<String, String> {
        &self.arguments
    }

    /// Arguments bound by the current request, in the order they were marked.
    pub fn required_arguments(&self) -> &[String] {
        &self.required_arguments
    }

    pub fn sub_fields(&self) -> &[QueryPart] {
        &self.sub_fields
    }

    pub fn declare_argument(&mut self, name: impl Into<String>, ty: impl Into<String>) {
        self.arguments.insert(name.into(), ty.into());
    }

    pub fn push_sub_field(&mut self, sub_field: QueryPart) {
        self.sub_fields.push(sub_field);
    }

    pub(crate) fn extend_sub_fields(&mut self, sub_fields: impl IntoIterator<Item = QueryPart>) {
        self.sub_fields.extend(sub_fields);
    }

    pub(crate) fn into_sub_fields(self) -> Vec<QueryPart> {
        self.sub_fields
    }

    /// Marks `argument` as bound by the request.
    ///
    /// If this field declares it, it is recorded here once; marking it again has no
    /// effect. Otherwise the call is forwarded to every sub field, so the argument is
    /// looked up by name anywhere below this node rather than by path.
    pub fn mark_argument_needed(&mut self, argument: &str) {
        if self.arguments.contains_key(argument) {
            if !self.required_arguments.iter().any(|arg| arg == argument) {
                self.required_arguments.push(argument.to_owned());
            }
        } else {
            for sub_field in &mut self.sub_fields {
                sub_field.mark_argument_needed(argument);
            }
        }
    }

    /// Variable definitions for every marked argument of this subtree, depth first,
    /// formatted as `$name:Type`.
    pub fn collect_required_arguments(&self) -> Vec<String> {
        let mut collected = Vec::new();
        self.collect_into(&mut collected);
        collected
    }

    fn collect_into(&self, collected: &mut Vec<String>) {
        collected.extend(self.required_arguments.iter().map(|arg| {
            let ty = self.arguments.get(arg).map(String::as_str).unwrap_or_default();
            format!("${arg}:{ty}")
        }));
        for sub_field in &self.sub_fields {
            sub_field.collect_into(collected);
        }
    }

    /// Renders this selection with `indent_width` spaces per nesting level.
    pub fn render(&self, indent_width: usize) -> String {
        Indented {
            part: self,
            indent_width,
        }
        .to_string()
    }

    pub(crate) fn write_selection<W: Write>(
        &self,
        out: &mut W,
        depth: usize,
        indent_width: usize,
    ) -> fmt::Result {
        let indent = depth * indent_width;
        write!(out, "{:indent$}{}", "", self.name)?;
        if !self.required_arguments.is_empty() {
            out.write_char('(')?;
            for (index, arg) in self.required_arguments.iter().enumerate() {
                if index > 0 {
                    out.write_str(", ")?;
                }
                write!(out, "{arg}:${arg}")?;
            }
            out.write_char(')')?;
        }
        if !self.sub_fields.is_empty() {
            out.write_str("{\n")?;
            for sub_field in &self.sub_fields {
                sub_field.write_selection(out, depth + 1, indent_width)?;
            }
            write!(out, "{:indent$}}}", "")?;
        }
        out.write_char('\n')
    }
}

impl fmt::Display for QueryPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_selection(f, 0, DEFAULT_INDENT_WIDTH)
    }
}

struct Indented<'a> {
    part: &'a QueryPart,
    indent_width: usize,
}

impl fmt::Display for Indented<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.part.write_selection(f, 0, self.indent_width)
    }
}
