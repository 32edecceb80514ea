// ==========================================
// 灾后修复项目管理系统 - 通知仓储
// ==========================================
// 存储: notification 表（按组织只读拉取,新的在前）
// ==========================================

use crate::domain::notification::Notification;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct NotificationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl NotificationRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    pub fn insert(&self, notification: &Notification) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO notification (notification_id, org_id, message, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                notification.notification_id,
                notification.org_id,
                notification.message,
                notification.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 查询组织通知（新的在前）
    pub fn list_by_org(&self, org_id: &str, limit: usize) -> RepositoryResult<Vec<Notification>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT notification_id, org_id, message, created_at
            FROM notification
            WHERE org_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )?;
        let rows = stmt.query_map(params![org_id, limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut notifications = Vec::new();
        for row in rows {
            let (notification_id, org_id, message, created_at) = row?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| RepositoryError::ValidationError(format!("created_at 格式错误: {}", e)))?
                .with_timezone(&Utc);
            notifications.push(Notification {
                notification_id,
                org_id,
                message,
                created_at,
            });
        }
        Ok(notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_list_newest_first_scoped_by_org() {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        let repo = NotificationRepository::from_connection(Arc::new(Mutex::new(conn)));

        let t0 = Utc::now();
        repo.insert(&Notification::new("org-1", "older", t0)).unwrap();
        repo.insert(&Notification::new("org-1", "newer", t0 + Duration::minutes(5))).unwrap();
        repo.insert(&Notification::new("org-2", "other org", t0)).unwrap();

        let list = repo.list_by_org("org-1", 10).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].message, "newer");
        assert_eq!(repo.list_by_org("org-1", 1).unwrap().len(), 1);
    }
}
