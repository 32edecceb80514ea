// ==========================================
// 灾后修复项目管理系统 - 含水率/环境读数领域模型
// ==========================================
// 约定: 读数日志只追加,按插入顺序,不校验日期唯一/递增
// 查找缺失 → None（不报错）
// ==========================================

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// AmbientConditions - 环境条件（室外/未受损区域）
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbientConditions {
    pub temperature: Option<f64>, // 温度（°F）
    pub humidity: Option<f64>,    // 相对湿度（%）
    pub gpp: Option<f64>,         // 比湿（grains per pound）
}

// ==========================================
// MaterialReading - 单个材料含水率
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialReading {
    pub material_id: String,
    pub moisture: Option<f64>, // 含水率（%）
}

// ==========================================
// ChamberReading - 干燥区读数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChamberReading {
    pub chamber_id: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub gpp: Option<f64>,
    pub material_readings: Vec<MaterialReading>,
}

impl ChamberReading {
    pub fn material_moisture(&self, material_id: &str) -> Option<f64> {
        self.material_readings
            .iter()
            .find(|m| m.material_id == material_id)
            .and_then(|m| m.moisture)
    }
}

// ==========================================
// MoistureReading - 日读数记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoistureReading {
    pub reading_id: String,
    pub date: String, // 录入日期原文（YYYY-MM-DD，不能为空,不校验格式）
    pub outside_conditions: AmbientConditions,
    pub unaffected_area_conditions: AmbientConditions,
    pub chamber_readings: Vec<ChamberReading>,
}

impl MoistureReading {
    pub fn new(date: &str) -> Self {
        Self {
            reading_id: Uuid::new_v4().to_string(),
            date: date.to_string(),
            outside_conditions: AmbientConditions::default(),
            unaffected_area_conditions: AmbientConditions::default(),
            chamber_readings: Vec::new(),
        }
    }

    pub fn chamber(&self, chamber_id: &str) -> Option<&ChamberReading> {
        self.chamber_readings.iter().find(|c| c.chamber_id == chamber_id)
    }

    pub fn chamber_mut(&mut self, chamber_id: &str) -> Option<&mut ChamberReading> {
        self.chamber_readings.iter_mut().find(|c| c.chamber_id == chamber_id)
    }

    /// 按 (干燥区, 材料) 查找含水率
    pub fn material_moisture(&self, chamber_id: &str, material_id: &str) -> Option<f64> {
        self.chamber(chamber_id)
            .and_then(|c| c.material_moisture(material_id))
    }
}
