// ==========================================
// 灾后修复项目管理系统 - 干燥区与设备领域模型
// ==========================================
// 干燥区: 若干房间组成的共用设备的干燥环境
// 设备部署: Active → Removed 单向状态机
// ==========================================

use crate::domain::types::{AssignmentState, EquipmentStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// EquipmentUnit - 设备库存记录
// ==========================================
// 对齐: equipment 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentUnit {
    pub equipment_id: String,
    pub org_id: String,
    pub equipment_type: String, // Dehumidifier / Air Mover / Air Scrubber
    pub model: String,
    pub serial_number: String,
    pub status: EquipmentStatus,
    #[serde(default)]
    pub specification: Option<f64>, // 按类型解释的规格值（见 SpecificationKey）
}

impl EquipmentUnit {
    pub fn new(org_id: &str, equipment_type: &str, model: &str, serial_number: &str) -> Self {
        Self {
            equipment_id: Uuid::new_v4().to_string(),
            org_id: org_id.to_string(),
            equipment_type: equipment_type.to_string(),
            model: model.to_string(),
            serial_number: serial_number.to_string(),
            status: EquipmentStatus::Available,
            specification: None,
        }
    }

    pub fn with_specification(mut self, specification: Option<f64>) -> Self {
        self.specification = specification;
        self
    }

    pub fn specification_key(&self) -> Option<SpecificationKey> {
        SpecificationKey::for_type(&self.equipment_type)
    }

    /// 规格展示文本（类型无规格或未录入时为 None）
    pub fn specification_label(&self) -> Option<String> {
        let key = self.specification_key()?;
        let value = self.specification?;
        Some(key.render(value))
    }
}

// ==========================================
// SpecificationKey - 设备类型对应的规格指标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecificationKey {
    AhamRating, // 除湿量（pints/day）
    CfmRating,  // 风量
    Optics,     // 羟基发生器光学组数
    Wattage,    // 发电机功率（W）
}

impl SpecificationKey {
    pub fn for_type(equipment_type: &str) -> Option<Self> {
        match equipment_type {
            "Dehumidifier" => Some(SpecificationKey::AhamRating),
            "Air Mover" | "Air Filtration Unit" | "Ozone Generator" => Some(SpecificationKey::CfmRating),
            "Hydroxyl Generator" => Some(SpecificationKey::Optics),
            "Portable Generator" => Some(SpecificationKey::Wattage),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecificationKey::AhamRating => "ahamRating",
            SpecificationKey::CfmRating => "cfmRating",
            SpecificationKey::Optics => "optics",
            SpecificationKey::Wattage => "wattage",
        }
    }

    pub fn render(&self, value: f64) -> String {
        match self {
            SpecificationKey::AhamRating => format!("AHAM Rating: {} pints/day", value),
            SpecificationKey::CfmRating => format!("CFM Rating: {}", value),
            SpecificationKey::Optics => format!("Optics: {}", value),
            SpecificationKey::Wattage => format!("Wattage: {}W", value),
        }
    }
}

// ==========================================
// EquipmentAssignment - 设备部署记录
// ==========================================
// 红线: runtime_hours 为派生值,只能由 set/removed 时间戳重算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentAssignment {
    pub assignment_id: String,
    pub equipment_id: String,
    pub equipment_type: String,
    pub model: String,
    pub serial_number: String,
    pub room_id: Option<String>,                    // 放置房间
    pub set_timestamp: DateTime<Utc>,               // 放置时间
    pub removed_timestamp: Option<DateTime<Utc>>,   // 撤出时间（None=运行中）
    pub runtime_hours: i64,                         // 运行小时数（派生）
}

impl EquipmentAssignment {
    pub fn state(&self) -> AssignmentState {
        if self.removed_timestamp.is_some() {
            AssignmentState::Removed
        } else {
            AssignmentState::Active
        }
    }

    pub fn is_active(&self) -> bool {
        self.removed_timestamp.is_none()
    }
}

// ==========================================
// DryingChamber - 干燥区
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DryingChamber {
    pub chamber_id: String,
    pub name: String,
    pub room_ids: Vec<String>,
    pub equipment: Vec<EquipmentAssignment>,
}

impl DryingChamber {
    pub fn new(name: &str, room_ids: Vec<String>) -> Self {
        Self {
            chamber_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            room_ids,
            equipment: Vec::new(),
        }
    }

    pub fn active_equipment(&self) -> impl Iterator<Item = &EquipmentAssignment> {
        self.equipment.iter().filter(|e| e.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specification_key_by_type() {
        assert_eq!(SpecificationKey::for_type("Dehumidifier"), Some(SpecificationKey::AhamRating));
        assert_eq!(SpecificationKey::for_type("Ozone Generator"), Some(SpecificationKey::CfmRating));
        assert_eq!(SpecificationKey::for_type("Hydroxyl Generator"), Some(SpecificationKey::Optics));
        assert_eq!(SpecificationKey::for_type("Portable Generator"), Some(SpecificationKey::Wattage));
        assert_eq!(SpecificationKey::for_type("Moisture Meter"), None);
    }

    #[test]
    fn test_specification_label() {
        let unit = EquipmentUnit::new("org-1", "Dehumidifier", "LGR 7000", "D-1").with_specification(Some(130.0));
        assert_eq!(unit.specification_label().as_deref(), Some("AHAM Rating: 130 pints/day"));

        let generator = EquipmentUnit::new("org-1", "Portable Generator", "G-1", "G-1").with_specification(Some(3500.0));
        assert_eq!(generator.specification_label().as_deref(), Some("Wattage: 3500W"));

        // 未录入或类型无规格
        assert!(EquipmentUnit::new("org-1", "Air Mover", "AM", "A-1").specification_label().is_none());
        let meter = EquipmentUnit::new("org-1", "Moisture Meter", "MM", "M-1").with_specification(Some(1.0));
        assert!(meter.specification_label().is_none());
    }
}
