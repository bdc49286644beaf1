//! Static types of row expressions
//!
//! The type system distinguishes:
//! - **Scalar types**: a [`SqlTypeName`] plus nullability
//! - **Row types**: ordered, named fields, each a shared [`RelDataTypeField`]
//!
//! Field descriptors are held by `Arc`. A row type hands out clones of its own
//! `Arc`s, so a field-access node and the catalog that produced the row type
//! point at the same descriptor and neither can mutate it.
//!
//! # Examples
//!
//! ```
//! # use quarry_rex::types::*;
//! let emp = RelDataType::row(vec![
//!     ("empno".to_string(), RelDataType::not_null(SqlTypeName::Integer)),
//!     ("deptno".to_string(), RelDataType::nullable(SqlTypeName::Integer)),
//! ]);
//! assert_eq!(
//!     emp.to_string(),
//!     "RecordType(INTEGER NOT NULL empno, INTEGER deptno)"
//! );
//!
//! let deptno = emp.as_row().unwrap().field("deptno", true).unwrap();
//! assert_eq!(deptno.index(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Scalar SQL type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlTypeName {
    Boolean,
    Integer,
    Bigint,
    Decimal,
    Double,
    Varchar,
    Date,
    Timestamp,
    /// Matches any type; used for untyped nulls.
    Any,
}

impl SqlTypeName {
    /// SQL spelling of this type name.
    pub fn name(self) -> &'static str {
        match self {
            SqlTypeName::Boolean => "BOOLEAN",
            SqlTypeName::Integer => "INTEGER",
            SqlTypeName::Bigint => "BIGINT",
            SqlTypeName::Decimal => "DECIMAL",
            SqlTypeName::Double => "DOUBLE",
            SqlTypeName::Varchar => "VARCHAR",
            SqlTypeName::Date => "DATE",
            SqlTypeName::Timestamp => "TIMESTAMP",
            SqlTypeName::Any => "ANY",
        }
    }

    /// Check if values of this type support arithmetic.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            SqlTypeName::Integer | SqlTypeName::Bigint | SqlTypeName::Decimal | SqlTypeName::Double
        )
    }
}

impl fmt::Display for SqlTypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static type of a row expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelDataType {
    /// Scalar value
    Scalar { name: SqlTypeName, nullable: bool },

    /// Composite value with named fields
    Row(RowType),
}

impl RelDataType {
    /// Create a NOT NULL scalar type.
    pub const fn not_null(name: SqlTypeName) -> Self {
        RelDataType::Scalar {
            name,
            nullable: false,
        }
    }

    /// Create a nullable scalar type.
    pub const fn nullable(name: SqlTypeName) -> Self {
        RelDataType::Scalar {
            name,
            nullable: true,
        }
    }

    /// Create a row type; field indices follow the given order.
    pub fn row(fields: Vec<(String, RelDataType)>) -> Self {
        RelDataType::Row(RowType::new(fields))
    }

    /// Check if this is a row type.
    pub fn is_row(&self) -> bool {
        matches!(self, RelDataType::Row(_))
    }

    /// Get the row type, if this is one.
    pub fn as_row(&self) -> Option<&RowType> {
        match self {
            RelDataType::Row(row) => Some(row),
            RelDataType::Scalar { .. } => None,
        }
    }

    /// Get the scalar type name, if this is a scalar.
    pub fn sql_type_name(&self) -> Option<SqlTypeName> {
        match self {
            RelDataType::Scalar { name, .. } => Some(*name),
            RelDataType::Row(_) => None,
        }
    }

    /// Whether values of this type may be null. Rows are never null.
    pub fn is_nullable(&self) -> bool {
        match self {
            RelDataType::Scalar { nullable, .. } => *nullable,
            RelDataType::Row(_) => false,
        }
    }

    /// Copy of this type with the given nullability. Rows are returned as is.
    pub fn with_nullability(&self, nullable: bool) -> Self {
        match self {
            RelDataType::Scalar { name, .. } => RelDataType::Scalar {
                name: *name,
                nullable,
            },
            RelDataType::Row(_) => self.clone(),
        }
    }
}

impl fmt::Display for RelDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelDataType::Scalar { name, nullable } => {
                write!(f, "{name}")?;
                if !nullable {
                    write!(f, " NOT NULL")?;
                }
                Ok(())
            }
            RelDataType::Row(row) => write!(f, "{row}"),
        }
    }
}

/// Ordered list of fields of a row type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowType {
    fields: Vec<Arc<RelDataTypeField>>,
}

impl RowType {
    /// Create a row type from `(name, type)` pairs.
    pub fn new(fields: Vec<(String, RelDataType)>) -> Self {
        let fields = fields
            .into_iter()
            .enumerate()
            .map(|(index, (name, ty))| Arc::new(RelDataTypeField::new(name, index, ty)))
            .collect();
        Self { fields }
    }

    /// All fields in ordinal order.
    pub fn fields(&self) -> &[Arc<RelDataTypeField>] {
        &self.fields
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name())
    }

    /// Field at the given ordinal.
    pub fn field_at(&self, index: usize) -> Option<&Arc<RelDataTypeField>> {
        self.fields.get(index)
    }

    /// Look up a field by name.
    ///
    /// With `case_sensitive == false` names are compared ignoring ASCII case
    /// and the first match in ordinal order wins.
    pub fn field(&self, name: &str, case_sensitive: bool) -> Option<&Arc<RelDataTypeField>> {
        if case_sensitive {
            self.fields.iter().find(|f| f.name() == name)
        } else {
            self.fields
                .iter()
                .find(|f| f.name().eq_ignore_ascii_case(name))
        }
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordType(")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", field.ty(), field.name())?;
        }
        write!(f, ")")
    }
}

/// A named, typed field of a row type.
///
/// Immutable once created. Shared by `Arc` between the row type that owns it
/// and every expression that reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelDataTypeField {
    name: String,
    index: usize,
    ty: RelDataType,
}

impl RelDataTypeField {
    pub fn new(name: impl Into<String>, index: usize, ty: RelDataType) -> Self {
        Self {
            name: name.into(),
            index,
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordinal of this field within its row type.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn ty(&self) -> &RelDataType {
        &self.ty
    }
}

impl fmt::Display for RelDataTypeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {} {}", self.index, self.name, self.ty)
    }
}
