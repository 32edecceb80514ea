// ==========================================
// 灾后修复项目管理系统 - 项目聚合根
// ==========================================
// 项目拥有: 受损房间、干燥区、读数日志、任务、备注、合规项状态
// 修改方式: 整体替换聚合（copy-on-write）,以 revision 做乐观锁
// ==========================================

use crate::domain::chamber::DryingChamber;
use crate::domain::reading::MoistureReading;
use crate::domain::room::{AffectedRoom, Material};
use crate::domain::task::{Note, Task};
use crate::domain::types::ProjectStatus;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 默认项目类型
pub const DEFAULT_PROJECT_TYPE: &str = "Water Damage";

// ==========================================
// ProjectIntake - 立项表单
// ==========================================
// 用途: 创建/更新项目的描述性字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectIntake {
    pub name: String,
    pub project_type: String,
    pub category: Option<String>, // 水损类别（仅 Water Damage）
    pub insurance_carrier: Option<String>,
    pub claim_number: Option<String>,
    pub date_of_loss: Option<NaiveDate>,
    pub customer_contact_date: Option<NaiveDate>,
    pub initial_inspection_date: Option<NaiveDate>,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub source_of_loss: Option<String>,
    pub status: ProjectStatus,
}

// ==========================================
// Project - 项目
// ==========================================
// 对齐: project 表（JSON 文档 + org_id + revision）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    // ===== 主键与归属 =====
    pub project_id: String,
    pub org_id: String,
    pub revision: i32, // 乐观锁版本号

    // ===== 描述字段 =====
    pub name: String,
    pub project_type: String,
    pub category: Option<String>,
    pub insurance_carrier: Option<String>,
    pub claim_number: Option<String>,
    pub date_of_loss: Option<NaiveDate>,
    pub customer_contact_date: Option<NaiveDate>,
    pub initial_inspection_date: Option<NaiveDate>,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub source_of_loss: Option<String>,
    pub status: ProjectStatus,

    // ===== 子集合 =====
    pub affected_rooms: Vec<AffectedRoom>,
    pub drying_chambers: Vec<DryingChamber>,
    pub moisture_readings: Vec<MoistureReading>,
    pub tasks: Vec<Task>,
    pub notes: Vec<Note>,
    pub compliance: BTreeMap<String, bool>, // 合规项键 → 是否完成

    // ===== 审计字段 =====
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>, // 状态置为 Completed 的时刻
}

impl Project {
    /// 从立项表单创建项目（空子集合, revision=0）
    pub fn from_intake(org_id: &str, intake: ProjectIntake, now: DateTime<Utc>) -> Self {
        let mut project = Self {
            project_id: Uuid::new_v4().to_string(),
            org_id: org_id.to_string(),
            revision: 0,
            name: String::new(),
            project_type: String::new(),
            category: None,
            insurance_carrier: None,
            claim_number: None,
            date_of_loss: None,
            customer_contact_date: None,
            initial_inspection_date: None,
            street_address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            source_of_loss: None,
            status: ProjectStatus::InProgress,
            affected_rooms: Vec::new(),
            drying_chambers: Vec::new(),
            moisture_readings: Vec::new(),
            tasks: Vec::new(),
            notes: Vec::new(),
            compliance: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        project.apply_intake(intake);
        project.sync_completion(now);
        project
    }

    /// 覆盖描述字段（子集合不变）
    pub fn apply_intake(&mut self, intake: ProjectIntake) {
        self.name = intake.name;
        self.project_type = if intake.project_type.trim().is_empty() {
            DEFAULT_PROJECT_TYPE.to_string()
        } else {
            intake.project_type
        };
        // 类别只对水损项目有意义
        self.category = if self.project_type == DEFAULT_PROJECT_TYPE {
            intake.category
        } else {
            None
        };
        self.insurance_carrier = intake.insurance_carrier;
        self.claim_number = intake.claim_number;
        self.date_of_loss = intake.date_of_loss;
        self.customer_contact_date = intake.customer_contact_date;
        self.initial_inspection_date = intake.initial_inspection_date;
        self.street_address = intake.street_address;
        self.city = intake.city;
        self.state = intake.state;
        self.zip_code = intake.zip_code;
        self.source_of_loss = intake.source_of_loss;
        self.status = intake.status;
    }

    /// 按状态维护完成时间: 进入 Completed 时记录,离开时清空
    pub fn sync_completion(&mut self, now: DateTime<Utc>) {
        if self.status == ProjectStatus::Completed {
            self.completed_at.get_or_insert(now);
        } else {
            self.completed_at = None;
        }
    }

    // ===== 子实体查找 =====

    pub fn find_room(&self, room_id: &str) -> Option<&AffectedRoom> {
        self.affected_rooms.iter().find(|r| r.room_id == room_id)
    }

    pub fn find_room_mut(&mut self, room_id: &str) -> Option<&mut AffectedRoom> {
        self.affected_rooms.iter_mut().find(|r| r.room_id == room_id)
    }

    pub fn find_chamber(&self, chamber_id: &str) -> Option<&DryingChamber> {
        self.drying_chambers.iter().find(|c| c.chamber_id == chamber_id)
    }

    pub fn find_chamber_mut(&mut self, chamber_id: &str) -> Option<&mut DryingChamber> {
        self.drying_chambers.iter_mut().find(|c| c.chamber_id == chamber_id)
    }

    pub fn find_task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.task_id == task_id)
    }

    /// 干燥区内所有房间的材料（按房间顺序展开,缺失房间跳过）
    pub fn chamber_materials(&self, chamber: &DryingChamber) -> Vec<&Material> {
        chamber
            .room_ids
            .iter()
            .filter_map(|room_id| self.find_room(room_id))
            .flat_map(|room| room.materials.iter())
            .collect()
    }

    /// 合规项是否完成（缺失键视为 false）
    pub fn compliance_flag(&self, key: &str) -> bool {
        self.compliance.get(key).copied().unwrap_or(false)
    }
}
