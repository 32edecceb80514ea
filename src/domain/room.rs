// ==========================================
// 灾后修复项目管理系统 - 受损房间领域模型
// ==========================================
// 红线: 面积字段是四个尺寸输入的纯函数,只能重算,不能单独编辑
// ==========================================

use crate::engine::dimension::DimensionCalculator;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ==========================================
// RoomDimensions - 房间尺寸输入
// ==========================================
// 保留录入原文（可能为空或非数字），解析在 DimensionCalculator 中完成
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensions {
    pub length: String,  // 长（英尺）
    pub width: String,   // 宽（英尺）
    pub height: String,  // 高（英尺）
    pub offsets: String, // 扣减面积（平方英尺，空=0）
}

impl RoomDimensions {
    pub fn new(length: &str, width: &str, height: &str, offsets: &str) -> Self {
        Self {
            length: length.to_string(),
            width: width.to_string(),
            height: height.to_string(),
            offsets: offsets.to_string(),
        }
    }
}

// ==========================================
// AffectedAreas - 派生受损面积（平方英尺）
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AffectedAreas {
    pub floor_sf: f64,
    pub wall_sf: f64,
    pub ceiling_sf: f64,
}

impl AffectedAreas {
    /// 两位小数展示值 (floor, wall, ceiling)
    pub fn formatted(&self) -> (String, String, String) {
        (
            format!("{:.2}", self.floor_sf),
            format!("{:.2}", self.wall_sf),
            format!("{:.2}", self.ceiling_sf),
        )
    }
}

// ==========================================
// Material - 受损材料
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub material_id: String,
    pub material_type: String,         // 材料类型（Carpet/Drywall/...）
    pub location: String,              // 位置（Floor/Wall/...）
    pub area: Option<f64>,             // 面积（平方英尺）
    pub initial_moisture: Option<f64>, // 初始含水率（%）
}

impl Material {
    pub fn new(material_type: &str, location: &str, area: Option<f64>, initial_moisture: Option<f64>) -> Self {
        Self {
            material_id: Uuid::new_v4().to_string(),
            material_type: material_type.to_string(),
            location: location.to_string(),
            area,
            initial_moisture,
        }
    }
}

// ==========================================
// AffectedRoom - 受损房间
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectedRoom {
    pub room_id: String,
    pub name: String,
    pub floor_level: String,
    dimensions: RoomDimensions,
    areas: AffectedAreas,
    pub materials: Vec<Material>,
}

impl AffectedRoom {
    /// 创建房间并立即计算面积
    pub fn new(name: &str, floor_level: &str, dimensions: RoomDimensions) -> Self {
        let areas = DimensionCalculator::calculate(&dimensions);
        Self {
            room_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            floor_level: floor_level.to_string(),
            dimensions,
            areas,
            materials: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> &RoomDimensions {
        &self.dimensions
    }

    pub fn areas(&self) -> AffectedAreas {
        self.areas
    }

    /// 修改尺寸（唯一入口，同时重算面积）
    pub fn set_dimensions(&mut self, dimensions: RoomDimensions) {
        self.areas = DimensionCalculator::calculate(&dimensions);
        self.dimensions = dimensions;
    }

    /// 按当前尺寸重算面积（用于加载外部数据后校正）
    pub fn recompute_areas(&mut self) {
        self.areas = DimensionCalculator::calculate(&self.dimensions);
    }

    pub fn find_material(&self, material_id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.material_id == material_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_dimensions_recomputes_areas() {
        let mut room = AffectedRoom::new("Living Room", "1", RoomDimensions::new("10", "12", "8", ""));
        assert_eq!(room.areas().floor_sf, 120.0);

        room.set_dimensions(RoomDimensions::new("20", "12", "8", "10"));
        assert_eq!(room.areas().floor_sf, 240.0);
        assert_eq!(room.areas().wall_sf, 2.0 * 32.0 * 8.0 - 10.0);
        assert_eq!(room.dimensions().length, "20");
    }
}
