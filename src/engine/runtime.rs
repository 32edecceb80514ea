// ==========================================
// 灾后修复项目管理系统 - 设备运行时长跟踪
// ==========================================
// 规则:
// - runtime_hours = round((end − set) / 3600000ms), end = removed 或 now
// - Active → Removed 单向;撤出后运行时长固定
// - 撤出的设备回到"可用设备"工作集（仅视图状态,不回写库存）
// ==========================================

use crate::domain::chamber::{EquipmentAssignment, EquipmentUnit};
use crate::domain::project::Project;
use crate::domain::types::{AssignmentState, EquipmentStatus};
use crate::engine::error::{EngineError, EngineResult};
use chrono::{DateTime, Utc};
use uuid::Uuid;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

// ==========================================
// EquipmentRuntimeTracker
// ==========================================
pub struct EquipmentRuntimeTracker;

impl EquipmentRuntimeTracker {
    /// 计算运行小时数（四舍五入,.5 向上取整）
    ///
    /// # 参数
    /// - set: 放置时间
    /// - removed: 撤出时间（None=仍在运行）
    /// - now: 评估时刻
    pub fn runtime_hours(
        set: DateTime<Utc>,
        removed: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> i64 {
        let end = removed.unwrap_or(now);
        let elapsed_ms = (end - set).num_milliseconds() as f64;
        (elapsed_ms / MILLIS_PER_HOUR + 0.5).floor() as i64
    }

    /// 重算单条部署记录的运行时长
    pub fn refresh_assignment(assignment: &mut EquipmentAssignment, now: DateTime<Utc>) {
        assignment.runtime_hours = Self::runtime_hours(
            assignment.set_timestamp,
            assignment.removed_timestamp,
            now,
        );
    }

    /// 重算项目内所有干燥区所有设备的运行时长
    ///
    /// # 返回
    /// - usize: 仍在运行的部署数量
    pub fn refresh_project(project: &mut Project, now: DateTime<Utc>) -> usize {
        let mut active = 0;
        for chamber in project.drying_chambers.iter_mut() {
            for assignment in chamber.equipment.iter_mut() {
                Self::refresh_assignment(assignment, now);
                if assignment.is_active() {
                    active += 1;
                }
            }
        }
        active
    }

    /// 将设备部署到干燥区
    ///
    /// # 返回
    /// - Ok(assignment_id)
    /// - Err: 干燥区不存在 / 房间不属于该干燥区 / 设备已在本项目运行
    pub fn assign(
        project: &mut Project,
        chamber_id: &str,
        unit: &EquipmentUnit,
        room_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> EngineResult<String> {
        let already_active = project
            .drying_chambers
            .iter()
            .flat_map(|c| c.active_equipment())
            .any(|a| a.equipment_id == unit.equipment_id);
        if already_active {
            return Err(EngineError::InvalidStateTransition {
                from: AssignmentState::Active.to_string(),
                to: AssignmentState::Active.to_string(),
            });
        }

        let chamber = project
            .find_chamber_mut(chamber_id)
            .ok_or_else(|| EngineError::not_found("DryingChamber", chamber_id))?;

        if let Some(room) = room_id {
            if !chamber.room_ids.iter().any(|r| r == room) {
                return Err(EngineError::InvalidInput(format!(
                    "房间 {} 不属于干燥区 {}",
                    room, chamber_id
                )));
            }
        }

        let assignment = EquipmentAssignment {
            assignment_id: Uuid::new_v4().to_string(),
            equipment_id: unit.equipment_id.clone(),
            equipment_type: unit.equipment_type.clone(),
            model: unit.model.clone(),
            serial_number: unit.serial_number.clone(),
            room_id: room_id.map(str::to_string),
            set_timestamp: now,
            removed_timestamp: None,
            runtime_hours: 0,
        };
        let assignment_id = assignment.assignment_id.clone();
        chamber.equipment.push(assignment);

        tracing::debug!(
            chamber_id,
            equipment_id = %unit.equipment_id,
            "设备已部署"
        );
        Ok(assignment_id)
    }

    /// 撤出设备
    ///
    /// # 返回
    /// - Ok(EquipmentUnit): 回到可用工作集的设备
    /// - Err: 记录不存在 / 已撤出（不支持重新激活）
    pub fn remove(
        project: &mut Project,
        chamber_id: &str,
        assignment_id: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<EquipmentUnit> {
        let org_id = project.org_id.clone();
        let chamber = project
            .find_chamber_mut(chamber_id)
            .ok_or_else(|| EngineError::not_found("DryingChamber", chamber_id))?;
        let assignment = chamber
            .equipment
            .iter_mut()
            .find(|a| a.assignment_id == assignment_id)
            .ok_or_else(|| EngineError::not_found("EquipmentAssignment", assignment_id))?;

        if !assignment.is_active() {
            return Err(EngineError::InvalidStateTransition {
                from: AssignmentState::Removed.to_string(),
                to: AssignmentState::Removed.to_string(),
            });
        }

        assignment.removed_timestamp = Some(now);
        Self::refresh_assignment(assignment, now);

        tracing::debug!(
            chamber_id,
            assignment_id,
            runtime_hours = assignment.runtime_hours,
            "设备已撤出"
        );

        Ok(EquipmentUnit {
            equipment_id: assignment.equipment_id.clone(),
            org_id,
            equipment_type: assignment.equipment_type.clone(),
            model: assignment.model.clone(),
            serial_number: assignment.serial_number.clone(),
            status: EquipmentStatus::Available,
            specification: None,
        })
    }

    /// 项目设备累计运行小时数
    pub fn total_runtime_hours(project: &Project) -> i64 {
        project
            .drying_chambers
            .iter()
            .flat_map(|c| c.equipment.iter())
            .map(|a| a.runtime_hours)
            .sum()
    }
}

// ==========================================
// AvailableEquipmentPool - 可用设备工作集
// ==========================================
// 仅视图状态: 部署时取出,撤出时放回,不回写库存系统
#[derive(Debug, Clone, Default)]
pub struct AvailableEquipmentPool {
    units: Vec<EquipmentUnit>,
}

impl AvailableEquipmentPool {
    pub fn new(units: Vec<EquipmentUnit>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &[EquipmentUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// 取出指定设备
    pub fn take(&mut self, equipment_id: &str) -> Option<EquipmentUnit> {
        let idx = self.units.iter().position(|u| u.equipment_id == equipment_id)?;
        Some(self.units.remove(idx))
    }

    /// 放回设备（同一设备不重复放入）
    pub fn give_back(&mut self, unit: EquipmentUnit) {
        if !self.units.iter().any(|u| u.equipment_id == unit.equipment_id) {
            self.units.push(unit);
        }
    }
}
