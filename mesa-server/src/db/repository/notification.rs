//! Notification Repository

use super::{RepoError, RepoResult};
use shared::models::{Notice, Notification};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, target_username, message, notification_type, reference_id, reference_type, is_read, created_at";

pub async fn insert(pool: &SqlitePool, notice: &Notice, now: i64) -> RepoResult<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO notification (target_username, message, notification_type, reference_id, reference_type, is_read, created_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6) RETURNING id",
    )
    .bind(&notice.target_username)
    .bind(&notice.message)
    .bind(notice.notification_type)
    .bind(notice.reference_id)
    .bind(notice.reference_type)
    .bind(now)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Notification>> {
    let sql = format!("SELECT {COLUMNS} FROM notification WHERE id = ?");
    let notification = sqlx::query_as::<_, Notification>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(notification)
}

/// Unread notifications for a user, oldest first
pub async fn find_unread(pool: &SqlitePool, username: &str) -> RepoResult<Vec<Notification>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM notification WHERE target_username = ? AND is_read = 0 ORDER BY created_at, id"
    );
    let notifications = sqlx::query_as::<_, Notification>(&sql)
        .bind(username)
        .fetch_all(pool)
        .await?;
    Ok(notifications)
}

pub async fn mark_read(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE notification SET is_read = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Notification {id} not found")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::test_support;
    use shared::models::{NotificationType, ReferenceType};

    fn notice(target: &str, reference_id: i64) -> Notice {
        Notice {
            target_username: target.into(),
            message: format!("New order #{reference_id} has been placed"),
            notification_type: NotificationType::NewOrder,
            reference_id,
            reference_type: ReferenceType::Order,
        }
    }

    #[tokio::test]
    async fn test_unread_and_mark_read() {
        let pool = test_support::pool().await;
        let first = insert(&pool, &notice("chef", 1), 1_000).await.unwrap();
        insert(&pool, &notice("chef", 2), 2_000).await.unwrap();
        insert(&pool, &notice("other", 3), 1_500).await.unwrap();

        let unread = find_unread(&pool, "chef").await.unwrap();
        assert_eq!(unread.len(), 2);
        assert_eq!(unread[0].reference_id, Some(1));
        assert_eq!(unread[0].reference_type, Some(ReferenceType::Order));
        assert!(!unread[0].is_read);

        mark_read(&pool, first).await.unwrap();
        assert_eq!(find_unread(&pool, "chef").await.unwrap().len(), 1);
        assert!(find_by_id(&pool, first).await.unwrap().unwrap().is_read);

        let err = mark_read(&pool, 999).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }
}
