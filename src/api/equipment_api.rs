// ==========================================
// 灾后修复项目管理系统 - 设备库存 API
// ==========================================
// 职责: 设备库存查询、增删改（按组织隔离）
// 门禁: 修改操作需要 manage_equipment
// ==========================================

use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult, FetchScope};
use crate::api::validator::require_permission;
use crate::domain::chamber::EquipmentUnit;
use crate::domain::session::Session;
use crate::domain::types::{EquipmentStatus, Permission};
use crate::engine::runtime::AvailableEquipmentPool;
use crate::repository::equipment_repo::EquipmentInventoryRepository;

pub struct EquipmentApi {
    equipment_repo: Arc<EquipmentInventoryRepository>,
}

impl EquipmentApi {
    pub fn new(equipment_repo: Arc<EquipmentInventoryRepository>) -> Self {
        Self { equipment_repo }
    }

    /// 查询组织设备
    pub fn list_equipment(
        &self,
        session: &Session,
        status: Option<EquipmentStatus>,
    ) -> ApiResult<Vec<EquipmentUnit>> {
        self.equipment_repo
            .list_by_org(&session.org_id, status)
            .map_err(|e| {
                tracing::error!(org_id = %session.org_id, error = %e, "设备列表拉取失败");
                ApiError::fetch_failed(FetchScope::Equipment, e)
            })
    }

    /// 可用设备工作集（部署选择用）
    pub fn available_pool(&self, session: &Session) -> ApiResult<AvailableEquipmentPool> {
        let units = self.list_equipment(session, Some(EquipmentStatus::Available))?;
        Ok(AvailableEquipmentPool::new(units))
    }

    pub fn create_equipment(
        &self,
        session: &Session,
        equipment_type: &str,
        model: &str,
        serial_number: &str,
        specification: Option<f64>,
    ) -> ApiResult<EquipmentUnit> {
        require_permission(session, Permission::ManageEquipment)?;
        if equipment_type.trim().is_empty() {
            return Err(ApiError::InvalidInput("设备类型不能为空".to_string()));
        }
        if serial_number.trim().is_empty() {
            return Err(ApiError::InvalidInput("序列号不能为空".to_string()));
        }

        let unit = EquipmentUnit::new(&session.org_id, equipment_type, model, serial_number)
            .with_specification(specification);
        self.equipment_repo.create(&unit)?;
        tracing::info!(
            equipment_id = %unit.equipment_id,
            serial_number,
            "设备已入库"
        );
        Ok(unit)
    }

    /// 更新设备（组织以会话为准）
    pub fn update_equipment(&self, session: &Session, unit: &EquipmentUnit) -> ApiResult<EquipmentUnit> {
        require_permission(session, Permission::ManageEquipment)?;
        if unit.serial_number.trim().is_empty() {
            return Err(ApiError::InvalidInput("序列号不能为空".to_string()));
        }
        let mut scoped = unit.clone();
        scoped.org_id = session.org_id.clone();
        self.equipment_repo.update(&scoped)?;
        Ok(scoped)
    }

    pub fn delete_equipment(&self, session: &Session, equipment_id: &str) -> ApiResult<()> {
        require_permission(session, Permission::ManageEquipment)?;
        self.equipment_repo.delete(&session.org_id, equipment_id)?;
        tracing::info!(equipment_id, "设备已删除");
        Ok(())
    }
}
