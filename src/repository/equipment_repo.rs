// ==========================================
// 灾后修复项目管理系统 - 设备库存仓储
// ==========================================
// 存储: equipment 表（同组织内序列号唯一）
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::chamber::EquipmentUnit;
use crate::domain::types::EquipmentStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// EquipmentInventoryRepository - 设备库存仓储
// ==========================================
pub struct EquipmentInventoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EquipmentInventoryRepository {
    /// 创建新的 EquipmentInventoryRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = crate::db::open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<EquipmentUnit> {
        Ok(EquipmentUnit {
            equipment_id: row.get(0)?,
            org_id: row.get(1)?,
            equipment_type: row.get(2)?,
            model: row.get(3)?,
            serial_number: row.get(4)?,
            status: EquipmentStatus::from_db_str(&row.get::<_, String>(5)?),
            specification: row.get(6)?,
        })
    }

    /// 新增设备
    ///
    /// # 错误
    /// - UniqueConstraintViolation: 同组织内序列号重复
    pub fn create(&self, unit: &EquipmentUnit) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO equipment (
                equipment_id, org_id, equipment_type, model, serial_number, status, specification
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                unit.equipment_id,
                unit.org_id,
                unit.equipment_type,
                unit.model,
                unit.serial_number,
                unit.status.to_string(),
                unit.specification,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(&self, org_id: &str, equipment_id: &str) -> RepositoryResult<Option<EquipmentUnit>> {
        let conn = self.get_conn()?;
        let unit = conn
            .query_row(
                r#"
                SELECT equipment_id, org_id, equipment_type, model, serial_number, status, specification
                FROM equipment
                WHERE equipment_id = ?1 AND org_id = ?2
                "#,
                params![equipment_id, org_id],
                Self::map_row,
            )
            .optional()?;
        Ok(unit)
    }

    /// 查询组织设备（可按状态过滤）
    pub fn list_by_org(
        &self,
        org_id: &str,
        status: Option<EquipmentStatus>,
    ) -> RepositoryResult<Vec<EquipmentUnit>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT equipment_id, org_id, equipment_type, model, serial_number, status, specification
            FROM equipment
            WHERE org_id = ?1 AND (?2 IS NULL OR status = ?2)
            ORDER BY equipment_type, serial_number
            "#,
        )?;
        let status_str = status.map(|s| s.to_string());
        let units = stmt
            .query_map(params![org_id, status_str], Self::map_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(units)
    }

    /// 更新设备（类型/型号/序列号/状态）
    pub fn update(&self, unit: &EquipmentUnit) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows_affected = conn.execute(
            r#"
            UPDATE equipment
            SET equipment_type = ?1, model = ?2, serial_number = ?3, status = ?4, specification = ?5
            WHERE equipment_id = ?6 AND org_id = ?7
            "#,
            params![
                unit.equipment_type,
                unit.model,
                unit.serial_number,
                unit.status.to_string(),
                unit.specification,
                unit.equipment_id,
                unit.org_id,
            ],
        )?;
        if rows_affected == 0 {
            return Err(RepositoryError::not_found("EquipmentUnit", &unit.equipment_id));
        }
        Ok(())
    }

    /// 仅更新状态
    pub fn update_status(
        &self,
        org_id: &str,
        equipment_id: &str,
        status: EquipmentStatus,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows_affected = conn.execute(
            "UPDATE equipment SET status = ?1 WHERE equipment_id = ?2 AND org_id = ?3",
            params![status.to_string(), equipment_id, org_id],
        )?;
        if rows_affected == 0 {
            return Err(RepositoryError::not_found("EquipmentUnit", equipment_id));
        }
        Ok(())
    }

    pub fn delete(&self, org_id: &str, equipment_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let rows_affected = conn.execute(
            "DELETE FROM equipment WHERE equipment_id = ?1 AND org_id = ?2",
            params![equipment_id, org_id],
        )?;
        if rows_affected == 0 {
            return Err(RepositoryError::not_found("EquipmentUnit", equipment_id));
        }
        Ok(())
    }
}
