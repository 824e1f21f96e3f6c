//! Pool: a fixed group of performers playing a round robin.

use crate::models::category::CategoryId;
use crate::models::performer::PerformerId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PoolId = Uuid;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub category_id: CategoryId,
    /// "Pool A", "Pool B", ...
    pub name: String,
    /// Members in seed order. Never changes after creation.
    pub performers: Vec<PerformerId>,
    /// Set once the pool's leader is unambiguous.
    pub winner: Option<PerformerId>,
}

impl Pool {
    /// Deterministic id: same category and index always give the same pool id.
    pub fn new(category_id: CategoryId, index: usize, performers: Vec<PerformerId>) -> Self {
        Self {
            id: Uuid::new_v5(&category_id, format!("pool/{index}").as_bytes()),
            category_id,
            name: pool_name(index),
            performers,
            winner: None,
        }
    }
}

/// 0 → "Pool A", 25 → "Pool Z", 26 → "Pool AA".
fn pool_name(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.reverse();
    format!("Pool {}", letters.into_iter().collect::<String>())
}
