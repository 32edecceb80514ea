// ==========================================
// 灾后修复项目管理系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==========================================
// ViewSettings - 项目视图运行参数快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewSettings {
    pub runtime_refresh_interval: Duration,
    pub task_generation_interval: Duration,
    pub notification_poll_interval: Duration,
    pub auto_task_title: String,
    pub compliance_requires_all_tasks: bool,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            runtime_refresh_interval: Duration::from_secs(defaults::RUNTIME_REFRESH_INTERVAL_SECS),
            task_generation_interval: Duration::from_secs(defaults::TASK_GENERATION_INTERVAL_SECS),
            notification_poll_interval: Duration::from_secs(defaults::NOTIFICATION_POLL_INTERVAL_SECS),
            auto_task_title: defaults::AUTO_TASK_TITLE.to_string(),
            compliance_requires_all_tasks: false,
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 写入 global scope 配置（UPSERT）
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 周期任务 =====

    /// 秒数配置（非法值或 0 回退到默认值）
    fn get_interval(&self, key: &str, default_secs: u64) -> Result<Duration, Box<dyn Error>> {
        let raw = self.get_config_or_default(key, &default_secs.to_string())?;
        let secs = match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                tracing::warn!(key, value = %raw, default_secs, "配置值非法,使用默认值");
                default_secs
            }
        };
        Ok(Duration::from_secs(secs))
    }

    /// 设备运行时长刷新周期（默认 60 秒）
    pub fn get_runtime_refresh_interval(&self) -> Result<Duration, Box<dyn Error>> {
        self.get_interval(
            config_keys::RUNTIME_REFRESH_INTERVAL_SECS,
            defaults::RUNTIME_REFRESH_INTERVAL_SECS,
        )
    }

    /// 自动任务生成周期（默认 60 秒）
    pub fn get_task_generation_interval(&self) -> Result<Duration, Box<dyn Error>> {
        self.get_interval(
            config_keys::TASK_GENERATION_INTERVAL_SECS,
            defaults::TASK_GENERATION_INTERVAL_SECS,
        )
    }

    /// 通知拉取周期（默认 300 秒）
    pub fn get_notification_poll_interval(&self) -> Result<Duration, Box<dyn Error>> {
        self.get_interval(
            config_keys::NOTIFICATION_POLL_INTERVAL_SECS,
            defaults::NOTIFICATION_POLL_INTERVAL_SECS,
        )
    }

    // ===== 任务与合规 =====

    pub fn get_auto_task_title(&self) -> Result<String, Box<dyn Error>> {
        let title = self.get_config_or_default(config_keys::AUTO_TASK_TITLE, defaults::AUTO_TASK_TITLE)?;
        if title.trim().is_empty() {
            return Ok(defaults::AUTO_TASK_TITLE.to_string());
        }
        Ok(title)
    }

    /// 合规判定是否额外要求关联任务全部完成
    pub fn get_compliance_requires_all_tasks(&self) -> Result<bool, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::COMPLIANCE_REQUIRES_ALL_TASKS, "false")?;
        Ok(matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
    }

    /// 一次性读取项目视图所需参数
    pub fn load_view_settings(&self) -> Result<ViewSettings, Box<dyn Error>> {
        Ok(ViewSettings {
            runtime_refresh_interval: self.get_runtime_refresh_interval()?,
            task_generation_interval: self.get_task_generation_interval()?,
            notification_poll_interval: self.get_notification_poll_interval()?,
            auto_task_title: self.get_auto_task_title()?,
            compliance_requires_all_tasks: self.get_compliance_requires_all_tasks()?,
        })
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 周期任务
    pub const RUNTIME_REFRESH_INTERVAL_SECS: &str = "runtime_refresh_interval_secs";
    pub const TASK_GENERATION_INTERVAL_SECS: &str = "task_generation_interval_secs";
    pub const NOTIFICATION_POLL_INTERVAL_SECS: &str = "notification_poll_interval_secs";

    // 任务与合规
    pub const AUTO_TASK_TITLE: &str = "auto_task_title";
    pub const COMPLIANCE_REQUIRES_ALL_TASKS: &str = "compliance_requires_all_tasks";
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const RUNTIME_REFRESH_INTERVAL_SECS: u64 = 60;
    pub const TASK_GENERATION_INTERVAL_SECS: u64 = 60;
    pub const NOTIFICATION_POLL_INTERVAL_SECS: u64 = 300;
    pub const AUTO_TASK_TITLE: &str = crate::engine::compliance::DEFAULT_AUTO_TASK_TITLE;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_when_absent() {
        let cfg = manager();
        assert_eq!(cfg.load_view_settings().unwrap(), ViewSettings::default());
        assert_eq!(cfg.get_notification_poll_interval().unwrap(), Duration::from_secs(300));
    }

    #[test]
    fn test_overrides_and_invalid_values() {
        let cfg = manager();
        cfg.set_config_value(config_keys::RUNTIME_REFRESH_INTERVAL_SECS, "15").unwrap();
        cfg.set_config_value(config_keys::TASK_GENERATION_INTERVAL_SECS, "abc").unwrap();
        cfg.set_config_value(config_keys::COMPLIANCE_REQUIRES_ALL_TASKS, "TRUE").unwrap();

        let s = cfg.load_view_settings().unwrap();
        assert_eq!(s.runtime_refresh_interval, Duration::from_secs(15));
        assert_eq!(s.task_generation_interval, Duration::from_secs(60));
        assert!(s.compliance_requires_all_tasks);

        let snapshot: BTreeMap<String, String> =
            serde_json::from_str(&cfg.get_config_snapshot().unwrap()).unwrap();
        assert_eq!(snapshot.len(), 3);
    }
}
