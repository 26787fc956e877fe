//! Column schema model threaded through the subquery chain.
//!
//! A `Schema` is an ordered name-to-type mapping describing the columns of the
//! most recently produced subquery. Projection steps replace it wholesale via
//! [`Schema::project`]; filter steps leave it untouched.

use std::fmt;

use crate::parser::FieldSelection;

/// Fixed scalar type vocabulary for workflow columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Unknown,
}

impl ColumnType {
    /// BigQuery-style upper-case rendering used in prompts and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered mapping from column name to declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<(String, ColumnType)>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from name/type pairs, preserving first-occurrence order.
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnType)>,
        S: Into<String>,
    {
        let mut schema = Self::new();
        for (name, ty) in columns {
            schema.insert(name.into(), ty);
        }
        schema
    }

    /// Insert a column. A name that already exists has its type replaced in
    /// place, keeping the position of the first occurrence; names stay unique.
    fn insert(&mut self, name: String, ty: ColumnType) {
        match self.columns.iter_mut().find(|entry| entry.0 == name) {
            Some(entry) => entry.1 = ty,
            None => self.columns.push((name, ty)),
        }
    }

    /// The fixed seed schema describing the untransformed source table.
    pub fn source_seed() -> Self {
        Self::from_columns([
            ("OrderID", ColumnType::String),
            ("CustomerName", ColumnType::String),
            ("ProductCategory", ColumnType::String),
            ("SalesAmount", ColumnType::Float),
        ])
    }

    /// Look up the declared type of a column.
    pub fn get(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|(col, _)| col == name)
            .map(|(_, ty)| *ty)
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Comma-joined column list for a SELECT clause.
    pub fn select_list(&self) -> String {
        self.column_names().collect::<Vec<_>>().join(", ")
    }

    /// Name-to-type table embedded in translation prompts, JSON-shaped for
    /// readability.
    pub fn to_prompt_table(&self) -> String {
        let mut out = String::from("{\n");
        for (i, (name, ty)) in self.columns.iter().enumerate() {
            let sep = if i + 1 == self.columns.len() { "" } else { "," };
            out.push_str(&format!("  \"{name}\": \"{ty}\"{sep}\n"));
        }
        out.push('}');
        out
    }

    /// Derive the schema produced by a projection step.
    ///
    /// Keeps only the fields marked selected, in the order they appear, keyed
    /// by the field's rename when present. Types are looked up by the original
    /// name; names absent from the input schema degrade to `UNKNOWN` so
    /// translation can proceed with incomplete type knowledge. Fields mapping
    /// to the same output name collapse to one entry, last type wins.
    pub fn project(&self, fields: &[FieldSelection]) -> Schema {
        let mut projected = Schema::new();
        for field in fields.iter().filter(|field| field.selected) {
            let output_name = field.rename.as_deref().unwrap_or(&field.name);
            let ty = self.get(&field.name).unwrap_or(ColumnType::Unknown);
            projected.insert(output_name.to_string(), ty);
        }
        projected
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
