//! Read-only product catalog queries. Rows come from the seeded reference
//! set plus anything the operator inserts out-of-band.

use rusqlite::{OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use crate::storage::{Store, StoreResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub specs: String,
    pub price: i64,
    pub image: String,
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        title: row.get(1)?,
        specs: row.get(2)?,
        price: row.get(3)?,
        image: row.get(4)?,
    })
}

pub async fn list(store: &Store) -> StoreResult<Vec<Product>> {
    store
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT id, title, specs, price, image FROM products")?;
            let rows = stmt.query_map([], product_from_row)?;
            let mut out = Vec::new();
            for p in rows {
                out.push(p?);
            }
            Ok(out)
        })
        .await
}

pub async fn by_id(store: &Store, id: i64) -> StoreResult<Option<Product>> {
    store
        .call(move |conn| {
            let p = conn
                .query_row(
                    "SELECT id, title, specs, price, image FROM products WHERE id = ?1",
                    params![id],
                    product_from_row,
                )
                .optional()?;
            Ok(p)
        })
        .await
}
