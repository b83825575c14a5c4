//! PostgreSQL item store: STAC documents in JSONB columns.
//!
//! Items keep their envelope in `bbox_*` columns next to the document so
//! spatial clauses compile to plain comparisons. Geo clauses are evaluated on
//! envelopes, not exact geometries.

use async_trait::async_trait;
use climate_common::{BoundingBox, ClimateError, ClimateResult};
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::types::Json;
use sqlx::{PgPool, QueryBuilder};
use stac_protocol::{Collection, Item};
use tracing::{debug, instrument};

use crate::query::{FilterClause, ItemFilter, ItemQuery};
use crate::store::ItemStore;

/// Item store backed by the `stac_item` and `stac_collection` tables.
pub struct PgItemStore {
    pool: PgPool,
}

impl PgItemStore {
    /// Create a new store from a database URL.
    pub async fn connect(database_url: &str) -> ClimateResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| ClimateError::DatabaseError(format!("Connection failed: {}", e)))?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> ClimateResult<()> {
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| ClimateError::DatabaseError(format!("Migration failed: {}", e)))?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl ItemStore for PgItemStore {
    #[instrument(skip(self, query), fields(limit = query.limit))]
    async fn search(&self, query: &ItemQuery) -> ClimateResult<Vec<Item>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT doc FROM stac_item WHERE TRUE");
        push_filter(&mut qb, &query.filter);
        qb.push(" ORDER BY seq LIMIT ");
        qb.push_bind(query.limit as i64);

        let rows: Vec<Json<Item>> = qb
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ClimateError::DatabaseError(format!("Search failed: {}", e)))?;

        debug!(found = rows.len(), "Searched stac_item");
        Ok(rows.into_iter().map(|Json(item)| item).collect())
    }

    #[instrument(skip(self))]
    async fn get_item(&self, collection_id: &str, item_id: &str) -> ClimateResult<Option<Item>> {
        let row: Option<Json<Item>> =
            sqlx::query_scalar("SELECT doc FROM stac_item WHERE collection = $1 AND id = $2")
                .bind(collection_id)
                .bind(item_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ClimateError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(row.map(|Json(item)| item))
    }

    async fn all_collections(&self) -> ClimateResult<Vec<Collection>> {
        let rows: Vec<Json<Collection>> =
            sqlx::query_scalar("SELECT doc FROM stac_collection ORDER BY seq")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| ClimateError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|Json(c)| c).collect())
    }

    #[instrument(skip(self))]
    async fn get_collection(&self, collection_id: &str) -> ClimateResult<Option<Collection>> {
        let row: Option<Json<Collection>> =
            sqlx::query_scalar("SELECT doc FROM stac_collection WHERE id = $1")
                .bind(collection_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ClimateError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(row.map(|Json(c)| c))
    }

    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn upsert_item(&self, item: &Item) -> ClimateResult<()> {
        let envelope = item.bounding_box();

        sqlx::query(
            r#"
            INSERT INTO stac_item (
                collection, id, doc,
                bbox_min_x, bbox_min_y, bbox_max_x, bbox_max_y
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (collection, id)
            DO UPDATE SET
                doc = EXCLUDED.doc,
                bbox_min_x = EXCLUDED.bbox_min_x,
                bbox_min_y = EXCLUDED.bbox_min_y,
                bbox_max_x = EXCLUDED.bbox_max_x,
                bbox_max_y = EXCLUDED.bbox_max_y
            "#,
        )
        .bind(item.collection.as_deref().unwrap_or(""))
        .bind(&item.id)
        .bind(Json(item))
        .bind(envelope.map(|b| b.min_x))
        .bind(envelope.map(|b| b.min_y))
        .bind(envelope.map(|b| b.max_x))
        .bind(envelope.map(|b| b.max_y))
        .execute(&self.pool)
        .await
        .map_err(|e| ClimateError::DatabaseError(format!("Insert failed: {}", e)))?;

        Ok(())
    }

    async fn upsert_collection(&self, collection: &Collection) -> ClimateResult<()> {
        sqlx::query(
            "INSERT INTO stac_collection (id, doc) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET doc = EXCLUDED.doc",
        )
        .bind(&collection.id)
        .bind(Json(collection))
        .execute(&self.pool)
        .await
        .map_err(|e| ClimateError::DatabaseError(format!("Insert failed: {}", e)))?;

        Ok(())
    }

    async fn ping(&self) -> ClimateResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| ClimateError::DatabaseError(format!("Ping failed: {}", e)))?;
        Ok(())
    }
}

// =============================================================================
// Filter compilation
// =============================================================================

#[derive(Clone, Copy)]
enum Operand<'a> {
    Bound(&'a Value),
    Sql(&'static str),
}

/// Append ` AND <condition>` for every clause of the filter.
pub fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ItemFilter) {
    for (field, clause) in filter.clauses() {
        qb.push(" AND ");
        push_clause(qb, field, clause);
    }
}

fn push_clause(qb: &mut QueryBuilder<'_, Postgres>, field: &str, clause: &FilterClause) {
    let path: Vec<String> = field.split('.').map(str::to_string).collect();

    match clause {
        FilterClause::Equals(v) => push_equals(qb, &path, Operand::Bound(v)),
        FilterClause::NotEquals(v) => {
            qb.push("NOT COALESCE(");
            push_equals(qb, &path, Operand::Bound(v));
            qb.push(", FALSE)");
        }
        FilterClause::In(options) => {
            qb.push("EXISTS (SELECT 1 FROM jsonb_array_elements(");
            qb.push_bind(Json(Value::Array(options.clone())));
            qb.push(") AS opt(value) WHERE ");
            push_equals(qb, &path, Operand::Sql("opt.value"));
            qb.push(")");
        }
        FilterClause::Range { gt, gte, lt, lte } => {
            qb.push("(TRUE");
            for (op, bound) in [(">", gt), (">=", gte), ("<", lt), ("<=", lte)] {
                if let Some(v) = bound {
                    // jsonb orders across types; restrict to same-typed values.
                    qb.push(" AND jsonb_typeof(");
                    push_path(qb, &path);
                    qb.push(") = jsonb_typeof(");
                    push_operand(qb, Operand::Bound(v));
                    qb.push(") AND ");
                    push_path(qb, &path);
                    qb.push(format!(" {} ", op));
                    push_operand(qb, Operand::Bound(v));
                }
            }
            qb.push(")");
        }
        FilterClause::GeoWithin(ring) => match BoundingBox::enclosing(ring) {
            Some(area) => {
                qb.push("(bbox_min_x >= ");
                qb.push_bind(area.min_x);
                qb.push(" AND bbox_min_y >= ");
                qb.push_bind(area.min_y);
                qb.push(" AND bbox_max_x <= ");
                qb.push_bind(area.max_x);
                qb.push(" AND bbox_max_y <= ");
                qb.push_bind(area.max_y);
                qb.push(")");
            }
            None => {
                qb.push("FALSE");
            }
        },
        FilterClause::GeoIntersects(geometry) => match geometry.bounding_box() {
            Some(area) => {
                qb.push("(bbox_min_x <= ");
                qb.push_bind(area.max_x);
                qb.push(" AND bbox_max_x >= ");
                qb.push_bind(area.min_x);
                qb.push(" AND bbox_min_y <= ");
                qb.push_bind(area.max_y);
                qb.push(" AND bbox_max_y >= ");
                qb.push_bind(area.min_y);
                qb.push(")");
            }
            None => {
                qb.push("FALSE");
            }
        },
    }
}

fn push_path(qb: &mut QueryBuilder<'_, Postgres>, path: &[String]) {
    qb.push("(doc #> ");
    qb.push_bind(path.to_vec());
    qb.push("::text[])");
}

fn push_operand(qb: &mut QueryBuilder<'_, Postgres>, operand: Operand<'_>) {
    match operand {
        Operand::Bound(v) => {
            qb.push_bind(Json(v.clone()));
        }
        Operand::Sql(sql) => {
            qb.push(sql);
        }
    }
}

/// Equal to the operand, or an array holding it.
fn push_equals(qb: &mut QueryBuilder<'_, Postgres>, path: &[String], rhs: Operand<'_>) {
    qb.push("(");
    push_path(qb, path);
    qb.push(" = ");
    push_operand(qb, rhs);
    qb.push(" OR ");
    push_path(qb, path);
    qb.push(" @> jsonb_build_array(");
    push_operand(qb, rhs);
    qb.push("))");
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS stac_collection (
    id TEXT PRIMARY KEY,
    doc JSONB NOT NULL,
    seq BIGSERIAL
);

CREATE TABLE IF NOT EXISTS stac_item (
    seq BIGSERIAL,
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    doc JSONB NOT NULL,
    bbox_min_x DOUBLE PRECISION,
    bbox_min_y DOUBLE PRECISION,
    bbox_max_x DOUBLE PRECISION,
    bbox_max_y DOUBLE PRECISION,

    PRIMARY KEY (collection, id)
);

CREATE INDEX IF NOT EXISTS idx_stac_item_seq ON stac_item(seq);
CREATE INDEX IF NOT EXISTS idx_stac_item_doc ON stac_item USING GIN (doc);
CREATE INDEX IF NOT EXISTS idx_stac_item_bbox ON stac_item(bbox_min_x, bbox_min_y, bbox_max_x, bbox_max_y)
"#;
