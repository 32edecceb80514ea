// ==========================================
// 灾后修复项目管理系统 - 合规项定义仓储
// ==========================================
// 存储: compliance_item 表（按 sort_order 排序）
// ==========================================

use crate::domain::task::ComplianceItem;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 默认合规项（空库时写入）
pub const DEFAULT_COMPLIANCE_ITEMS: &[(&str, &str)] = &[
    ("initial_inspection", "Initial inspection documented"),
    ("moisture_map", "Moisture map recorded"),
    ("equipment_log", "Equipment placement logged"),
    ("customer_signoff", "Customer authorization signed"),
];

pub struct ComplianceItemRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ComplianceItemRepository {
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

    pub fn list(&self) -> RepositoryResult<Vec<ComplianceItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT key, description, required FROM compliance_item ORDER BY sort_order, key",
        )?;
        let items = stmt
            .query_map([], |row| {
                Ok(ComplianceItem {
                    key: row.get(0)?,
                    description: row.get(1)?,
                    required: row.get::<_, i64>(2)? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    /// 写入/覆盖合规项定义
    pub fn upsert(&self, item: &ComplianceItem, sort_order: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO compliance_item (key, description, required, sort_order)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(key) DO UPDATE SET
                description = excluded.description,
                required = excluded.required,
                sort_order = excluded.sort_order
            "#,
            params![item.key, item.description, item.required as i64, sort_order],
        )?;
        Ok(())
    }

    /// 空表时写入默认合规项
    ///
    /// # 返回
    /// - Ok(usize): 写入条数（已有数据时为 0）
    pub fn seed_defaults(&self) -> RepositoryResult<usize> {
        let existing: i64 = {
            let conn = self.get_conn()?;
            conn.query_row("SELECT COUNT(*) FROM compliance_item", [], |row| row.get(0))?
        };
        if existing > 0 {
            return Ok(0);
        }
        for (idx, (key, description)) in DEFAULT_COMPLIANCE_ITEMS.iter().enumerate() {
            self.upsert(&ComplianceItem::new(key, description), idx as i64)?;
        }
        Ok(DEFAULT_COMPLIANCE_ITEMS.len())
    }
}
