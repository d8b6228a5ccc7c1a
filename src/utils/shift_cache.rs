use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::OnceCell;
use sqlx::MySqlPool;
use std::time::Duration;

use crate::model::shift::Shift;

const DEFAULT_TTL_SECS: u64 = 3600;

/// Shifts by id. Shifts are reference data read on every check-in and
/// report, and change rarely.
static SHIFT_CACHE: OnceCell<Cache<u64, Shift>> = OnceCell::new();

fn build(ttl: Duration) -> Cache<u64, Shift> {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(ttl)
        .build()
}

/// Set the cache TTL. Only the first call has an effect.
pub fn init(ttl_secs: u64) {
    let _ = SHIFT_CACHE.set(build(Duration::from_secs(ttl_secs)));
}

fn cache() -> &'static Cache<u64, Shift> {
    SHIFT_CACHE.get_or_init(|| build(Duration::from_secs(DEFAULT_TTL_SECS)))
}

pub async fn get(id: u64) -> Option<Shift> {
    cache().get(&id).await
}

pub async fn put(shift: Shift) {
    cache().insert(shift.id, shift).await;
}

pub async fn invalidate(id: u64) {
    cache().invalidate(&id).await;
}

pub const SELECT_SHIFT: &str = r#"
    SELECT id, name, start_time, end_time, department_id, is_active
    FROM shifts
"#;

/// Cache-through lookup
pub async fn fetch_shift(pool: &MySqlPool, id: u64) -> Result<Option<Shift>, sqlx::Error> {
    if let Some(shift) = get(id).await {
        return Ok(Some(shift));
    }

    let shift = sqlx::query_as::<_, Shift>(&format!("{SELECT_SHIFT} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if let Some(shift) = &shift {
        put(shift.clone()).await;
    }

    Ok(shift)
}

/// Load active shifts into the cache (streamed, batched)
pub async fn warmup_shift_cache(pool: &MySqlPool, batch_size: usize) -> Result<()> {
    let sql = format!("{SELECT_SHIFT} WHERE is_active = TRUE");
    let mut stream = sqlx::query_as::<_, Shift>(&sql).fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        batch.push(row?);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_put(&mut batch).await;
        }
    }

    if !batch.is_empty() {
        batch_put(&mut batch).await;
    }

    log::info!("Shift cache warmup complete: {} active shifts", total_count);

    Ok(())
}

async fn batch_put(batch: &mut Vec<Shift>) {
    let futures: Vec<_> = batch.drain(..).map(put).collect();
    futures::future::join_all(futures).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn shift(id: u64) -> Shift {
        Shift {
            id,
            name: format!("shift-{id}"),
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            department_id: None,
            is_active: true,
        }
    }

    #[actix_web::test]
    async fn test_put_get_invalidate() {
        put(shift(90_001)).await;
        assert_eq!(get(90_001).await.map(|s| s.name), Some("shift-90001".to_string()));

        invalidate(90_001).await;
        assert!(get(90_001).await.is_none());
    }

    #[actix_web::test]
    async fn test_batch_put_drains() {
        let mut batch = vec![shift(90_101), shift(90_102)];
        batch_put(&mut batch).await;
        assert!(batch.is_empty());
        assert!(get(90_102).await.is_some());
    }
}
