//! Value-level expression nodes.

use crate::error::BuildResult;
use crate::expr::func::{AggFunc, SqlFunc};
use crate::expr::render_template;
use crate::render::{RenderFlags, SqlBuilder};
use crate::schema::{Column, DataType};
use crate::value::{ToValue, Value};

/// A value-level expression node.
///
/// Every node knows its result data type, can enumerate the columns it
/// references, and renders itself into a [`SqlBuilder`] under context flags.
#[derive(Debug, Clone)]
pub enum ColumnExpr {
    /// Reference to a column.
    Column(Column),
    /// A literal value, parameterized or dialect-escaped at render time.
    Literal {
        /// The value.
        value: Value,
        /// The logical type the literal is used as.
        data_type: DataType,
    },
    /// A scalar function call.
    Function {
        /// The function kind.
        func: SqlFunc,
        /// Arguments; the first fills `?` in the phrase template.
        args: Vec<ColumnExpr>,
    },
    /// An aggregate wrapper; `None` argument means `*`.
    Aggregate {
        /// The aggregate kind.
        func: AggFunc,
        /// The aggregated expression.
        arg: Option<Box<ColumnExpr>>,
        /// Whether DISTINCT is applied.
        distinct: bool,
    },
    /// An explicit cast, rendered through the dialect convert phrase.
    Convert {
        /// The expression being converted.
        expr: Box<ColumnExpr>,
        /// Conversion target type.
        target: DataType,
        /// Optional vendor format argument.
        format: Option<String>,
    },
    /// An alias wrapper, decorated only when the ALIAS flag is set.
    Alias {
        /// The aliased expression.
        expr: Box<ColumnExpr>,
        /// The alias name.
        alias: String,
    },
}

impl ColumnExpr {
    /// Creates a literal expression from any convertible value.
    #[must_use]
    pub fn value(value: impl ToValue) -> Self {
        let value = value.to_value();
        let data_type = value.data_type();
        Self::Literal { value, data_type }
    }

    /// Creates a literal carrying an explicit logical type.
    #[must_use]
    pub fn typed_value(value: impl ToValue, data_type: DataType) -> Self {
        Self::Literal {
            value: value.to_value(),
            data_type,
        }
    }

    /// Returns the result data type of this expression.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Column(c) => *c.data_type(),
            Self::Literal { data_type, .. } | Self::Convert { target: data_type, .. } => *data_type,
            Self::Function { func, args } => func.result_type(
                args.first()
                    .map_or(DataType::Unknown, ColumnExpr::data_type),
            ),
            Self::Aggregate { func, arg, .. } => func.result_type(
                arg.as_deref()
                    .map_or(DataType::Integer, ColumnExpr::data_type),
            ),
            Self::Alias { expr, .. } => expr.data_type(),
        }
    }

    /// Appends every column referenced by this subtree to `out`.
    pub fn collect_columns(&self, out: &mut Vec<Column>) {
        match self {
            Self::Column(c) => out.push(c.clone()),
            Self::Literal { .. } => {}
            Self::Function { args, .. } => {
                for arg in args {
                    arg.collect_columns(out);
                }
            }
            Self::Aggregate { arg, .. } => {
                if let Some(arg) = arg {
                    arg.collect_columns(out);
                }
            }
            Self::Convert { expr, .. } | Self::Alias { expr, .. } => expr.collect_columns(out),
        }
    }

    /// Returns whether this subtree contains an aggregate.
    ///
    /// Aggregates report themselves non-groupable: `group_by_all` skips any
    /// select expression for which this returns true.
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        match self {
            Self::Aggregate { .. } => true,
            Self::Column(_) | Self::Literal { .. } => false,
            Self::Function { args, .. } => args.iter().any(ColumnExpr::is_aggregate),
            Self::Convert { expr, .. } | Self::Alias { expr, .. } => expr.is_aggregate(),
        }
    }

    /// Renders this expression.
    ///
    /// # Errors
    ///
    /// Fails when a convert target cannot be mapped by the dialect.
    pub fn render_into(&self, builder: &mut SqlBuilder<'_>, flags: RenderFlags) -> BuildResult<()> {
        match self {
            Self::Column(c) => {
                if flags.contains(RenderFlags::FULL_NAME) {
                    builder.append_qualified(c.rowset_name(), c.name());
                } else {
                    builder.append_identifier(c.name());
                }
                Ok(())
            }
            Self::Literal { value, .. } => {
                builder.append_value(value);
                Ok(())
            }
            Self::Function { func, args } => {
                let phrase = builder.dialect().function_phrase(*func);
                render_template(builder, phrase, args, flags)
            }
            Self::Aggregate {
                func,
                arg,
                distinct,
            } => {
                builder.append(func.as_str());
                builder.append_char('(');
                if *distinct {
                    builder.append("DISTINCT ");
                }
                match arg {
                    Some(expr) => expr.render_into(builder, flags)?,
                    None => builder.append_char('*'),
                }
                builder.append_char(')');
                Ok(())
            }
            Self::Convert {
                expr,
                target,
                format,
            } => {
                let phrase = builder.dialect().convert_phrase(
                    target,
                    &expr.data_type(),
                    format.as_deref(),
                )?;
                render_template(builder, &phrase, std::slice::from_ref(expr.as_ref()), flags)
            }
            Self::Alias { expr, alias } => {
                expr.render_into(builder, flags)?;
                if flags.contains(RenderFlags::ALIAS) {
                    builder.append(" AS ");
                    builder.append_identifier(alias);
                }
                Ok(())
            }
        }
    }

    /// Wraps this expression under an alias.
    #[must_use]
    pub fn alias(self, name: impl Into<String>) -> Self {
        Self::Alias {
            expr: Box::new(self),
            alias: name.into(),
        }
    }

    /// Wraps this expression in an explicit cast.
    #[must_use]
    pub fn convert_to(self, target: DataType) -> Self {
        Self::Convert {
            expr: Box::new(self),
            target,
            format: None,
        }
    }

    /// Upper-case conversion.
    #[must_use]
    pub fn upper(self) -> Self {
        Self::Function {
            func: SqlFunc::Upper,
            args: vec![self],
        }
    }

    /// Lower-case conversion.
    #[must_use]
    pub fn lower(self) -> Self {
        Self::Function {
            func: SqlFunc::Lower,
            args: vec![self],
        }
    }

    /// Whitespace trim.
    #[must_use]
    pub fn trim(self) -> Self {
        Self::Function {
            func: SqlFunc::Trim,
            args: vec![self],
        }
    }

    /// String length.
    #[must_use]
    pub fn length(self) -> Self {
        Self::Function {
            func: SqlFunc::Length,
            args: vec![self],
        }
    }

    /// Substring starting at `start` (1-based) with `length` characters.
    #[must_use]
    pub fn substring(self, start: i64, length: i64) -> Self {
        Self::Function {
            func: SqlFunc::Substring,
            args: vec![self, Self::value(start), Self::value(length)],
        }
    }

    /// First non-null of `self` and `fallback`.
    #[must_use]
    pub fn coalesce(self, fallback: impl ToValue) -> Self {
        Self::Function {
            func: SqlFunc::Coalesce,
            args: vec![self, Self::value(fallback)],
        }
    }

    /// Concatenation with another expression.
    #[must_use]
    pub fn concat(self, other: Self) -> Self {
        Self::Function {
            func: SqlFunc::Concat,
            args: vec![self, other],
        }
    }

    /// Sum aggregate.
    #[must_use]
    pub fn sum(self) -> Self {
        Self::Aggregate {
            func: AggFunc::Sum,
            arg: Some(Box::new(self)),
            distinct: false,
        }
    }

    /// Minimum aggregate.
    #[must_use]
    pub fn min(self) -> Self {
        Self::Aggregate {
            func: AggFunc::Min,
            arg: Some(Box::new(self)),
            distinct: false,
        }
    }

    /// Maximum aggregate.
    #[must_use]
    pub fn max(self) -> Self {
        Self::Aggregate {
            func: AggFunc::Max,
            arg: Some(Box::new(self)),
            distinct: false,
        }
    }

    /// Average aggregate.
    #[must_use]
    pub fn avg(self) -> Self {
        Self::Aggregate {
            func: AggFunc::Avg,
            arg: Some(Box::new(self)),
            distinct: false,
        }
    }

    /// Count aggregate over this expression.
    #[must_use]
    pub fn count(self) -> Self {
        Self::Aggregate {
            func: AggFunc::Count,
            arg: Some(Box::new(self)),
            distinct: false,
        }
    }
}

/// `COUNT(*)`.
#[must_use]
pub fn count_all() -> ColumnExpr {
    ColumnExpr::Aggregate {
        func: AggFunc::Count,
        arg: None,
        distinct: false,
    }
}

impl From<Column> for ColumnExpr {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

impl From<&Column> for ColumnExpr {
    fn from(column: &Column) -> Self {
        Self::Column(column.clone())
    }
}
