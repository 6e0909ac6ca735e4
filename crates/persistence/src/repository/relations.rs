//! Generic eager loading of an entity's direct relations.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use sea_orm::sea_query::{Alias, Asterisk, Expr, Iden, Query};
use sea_orm::{
    ConnectionTrait, DbBackend, DbErr, EntityTrait, FromQueryResult, IdenStatic, Identity,
    Iterable, ModelTrait, RelationDef, RelationTrait, Statement,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// A model together with the rows of every relation declared on its entity.
///
/// Related rows are untyped, keyed by the relation variant name (`"Posts"`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithRelations<M> {
    #[serde(flatten)]
    pub model: M,
    pub relations: BTreeMap<String, Vec<JsonValue>>,
}

/// Load the rows of each relation of `E` that point at (or from) `model`.
///
/// One statement per relation, issued concurrently. Relations keyed on
/// composite columns are skipped.
pub(crate) async fn load_relations<E, C>(
    db: &C,
    model: &E::Model,
) -> Result<BTreeMap<String, Vec<JsonValue>>, DbErr>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();

    let loads = E::Relation::iter().filter_map(|relation| {
        let name = format!("{relation:?}");
        let Some(stmt) = related_rows::<E>(backend, &relation.def(), model) else {
            tracing::debug!(relation = %name, "Skipping relation with composite key");
            return None;
        };

        Some(async move {
            let rows = JsonValue::find_by_statement(stmt).all(db).await?;
            Ok::<_, DbErr>((name, rows))
        })
    });

    Ok(try_join_all(loads).await?.into_iter().collect())
}

fn related_rows<E: EntityTrait>(
    backend: DbBackend,
    def: &RelationDef,
    model: &E::Model,
) -> Option<Statement> {
    let (Identity::Unary(from), Identity::Unary(to)) = (&def.from_col, &def.to_col) else {
        return None;
    };

    let from = Iden::to_string(&**from);
    let column = E::Column::iter().find(|c| c.as_str() == from.as_str())?;

    let stmt = Query::select()
        .column(Asterisk)
        .from(def.to_tbl.clone())
        .and_where(Expr::col(Alias::new(Iden::to_string(&**to))).eq(model.get(column)))
        .to_owned();

    Some(backend.build(&stmt))
}
