//! Equality filters and partial updates expressed without reflection.

use std::collections::BTreeMap;

use sea_orm::sea_query::{Alias, Expr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, Iterable, ModelTrait, PrimaryKeyToColumn, Value,
};

use common::{AppError, AppResult};

/// One `column = value` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub column: String,
    pub value: Value,
}

impl Field {
    pub fn new(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Filter for `find_by`-style lookups.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Column name to required value
    Columns(BTreeMap<String, Value>),
    /// Field list, merged; a repeated column keeps its last value
    Fields(Vec<Field>),
    /// Arbitrary condition, applied as is
    Expr(Condition),
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        match self {
            Filter::Columns(columns) => columns.is_empty(),
            Filter::Fields(fields) => fields.is_empty(),
            Filter::Expr(condition) => condition.is_empty(),
        }
    }

    /// Conjunction of the filter's predicates.
    ///
    /// Fails with `InvalidArgument` when there is nothing to filter on.
    pub fn into_condition(self) -> AppResult<Condition> {
        if self.is_empty() {
            return Err(AppError::invalid_argument("no fields in where clause"));
        }

        let columns = match self {
            Filter::Expr(condition) => return Ok(condition),
            Filter::Columns(columns) => columns,
            Filter::Fields(fields) => merge(fields),
        };

        Ok(columns.into_iter().fold(Condition::all(), |cond, (column, value)| {
            cond.add(Expr::col(Alias::new(column)).eq(value))
        }))
    }
}

impl From<Vec<Field>> for Filter {
    fn from(fields: Vec<Field>) -> Self {
        Filter::Fields(fields)
    }
}

impl From<Field> for Filter {
    fn from(field: Field) -> Self {
        Filter::Fields(vec![field])
    }
}

impl From<BTreeMap<String, Value>> for Filter {
    fn from(columns: BTreeMap<String, Value>) -> Self {
        Filter::Columns(columns)
    }
}

impl From<Condition> for Filter {
    fn from(condition: Condition) -> Self {
        Filter::Expr(condition)
    }
}

/// Column assignments for a partial update.
#[derive(Debug, Clone)]
pub enum Changes {
    Columns(BTreeMap<String, Value>),
    Fields(Vec<Field>),
    /// Column name to SQL expression, e.g. `Expr::cust("views + 1")`
    Exprs(Vec<(String, SimpleExpr)>),
}

impl Changes {
    pub fn is_empty(&self) -> bool {
        match self {
            Changes::Columns(columns) => columns.is_empty(),
            Changes::Fields(fields) => fields.is_empty(),
            Changes::Exprs(exprs) => exprs.is_empty(),
        }
    }

    /// Assignments in column order; `InvalidArgument` when there are none.
    pub fn into_assignments(self) -> AppResult<Vec<(String, SimpleExpr)>> {
        if self.is_empty() {
            return Err(AppError::invalid_argument("no fields to update"));
        }

        let columns = match self {
            Changes::Exprs(exprs) => return Ok(exprs),
            Changes::Columns(columns) => columns,
            Changes::Fields(fields) => merge(fields),
        };

        Ok(columns
            .into_iter()
            .map(|(column, value)| (column, SimpleExpr::Value(value)))
            .collect())
    }
}

impl From<Vec<Field>> for Changes {
    fn from(fields: Vec<Field>) -> Self {
        Changes::Fields(fields)
    }
}

impl From<BTreeMap<String, Value>> for Changes {
    fn from(columns: BTreeMap<String, Value>) -> Self {
        Changes::Columns(columns)
    }
}

fn merge(fields: Vec<Field>) -> BTreeMap<String, Value> {
    fields.into_iter().map(|f| (f.column, f.value)).collect()
}

/// Condition matching exactly the row `model` was loaded from, by primary key.
pub fn identity_condition<E: EntityTrait>(model: &E::Model) -> Condition {
    E::PrimaryKey::iter().fold(Condition::all(), |cond, key| {
        let column = key.into_column();
        cond.add(column.eq(model.get(column)))
    })
}
