// ==========================================
// 灾后修复项目管理系统 - 房间面积计算
// ==========================================
// 规则:
// - floor   = length × width
// - wall    = 2 × (length + width) × height − offsets
// - ceiling = floor
// 红线: 无状态、无副作用;非数字输入按 0 处理;墙面积不做下限截断
// ==========================================

use crate::domain::room::{AffectedAreas, RoomDimensions};

// ==========================================
// DimensionCalculator - 纯函数工具类
// ==========================================
pub struct DimensionCalculator;

impl DimensionCalculator {
    /// 计算受损面积
    ///
    /// # 参数
    /// - dimensions: 尺寸录入原文
    ///
    /// # 返回
    /// - AffectedAreas: 地面/墙面/顶面面积（平方英尺）
    pub fn calculate(dimensions: &RoomDimensions) -> AffectedAreas {
        let length = parse_dimension(&dimensions.length);
        let width = parse_dimension(&dimensions.width);
        let height = parse_dimension(&dimensions.height);
        let offsets = parse_dimension(&dimensions.offsets);

        Self::calculate_values(length, width, height, offsets)
    }

    /// 按数值计算受损面积
    pub fn calculate_values(length: f64, width: f64, height: f64, offsets: f64) -> AffectedAreas {
        let floor_sf = length * width;
        let wall_sf = 2.0 * (length + width) * height - offsets;

        AffectedAreas {
            floor_sf,
            wall_sf,
            ceiling_sf: floor_sf,
        }
    }
}

/// 宽松数值解析
///
/// - 去除首尾空白
/// - 取最长的合法数值前缀（"12ft" → 12）
/// - 空串、非数字、非有限值 → 0
pub fn parse_dimension(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    if let Ok(v) = s.parse::<f64>() {
        return if v.is_finite() { v } else { 0.0 };
    }

    // 只接受数字相关字符组成的前缀
    let prefix_len = s
        .char_indices()
        .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .map(|(i, c)| i + c.len_utf8())
        .last()
        .unwrap_or(0);

    (1..=prefix_len)
        .rev()
        .filter_map(|end| s[..end].parse::<f64>().ok())
        .find(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calculate_basic_room() {
        let areas = DimensionCalculator::calculate(&RoomDimensions::new("12", "10", "8", "20"));
        assert_eq!(areas.floor_sf, 120.0);
        assert_eq!(areas.ceiling_sf, 120.0);
        assert_eq!(areas.wall_sf, 2.0 * 22.0 * 8.0 - 20.0);
    }

    #[test]
    fn test_blank_offsets_default_to_zero() {
        let areas = DimensionCalculator::calculate(&RoomDimensions::new("10", "10", "8", ""));
        assert_eq!(areas.wall_sf, 320.0);
    }

    #[test]
    fn test_non_numeric_dimension_zeroes_out() {
        // 非数字长度 → 0，地面面积归零
        let areas = DimensionCalculator::calculate(&RoomDimensions::new("abc", "10", "8", ""));
        assert_eq!(areas.floor_sf, 0.0);
        assert_eq!(areas.wall_sf, 160.0);
    }

    #[test]
    fn test_negative_wall_area_is_not_clamped() {
        let areas = DimensionCalculator::calculate(&RoomDimensions::new("2", "2", "1", "100"));
        assert_eq!(areas.wall_sf, 8.0 - 100.0);
    }

    #[test]
    fn test_formatted_two_decimals() {
        let areas = DimensionCalculator::calculate_values(10.5, 3.2, 8.0, 0.0);
        let (floor, wall, ceiling) = areas.formatted();
        assert_eq!(floor, "33.60");
        assert_eq!(wall, "219.20");
        assert_eq!(ceiling, "33.60");
    }

    #[test]
    fn test_parse_dimension_lenient_prefix() {
        assert_eq!(parse_dimension("12ft"), 12.0);
        assert_eq!(parse_dimension(" 7.5 "), 7.5);
        assert_eq!(parse_dimension("1e2x"), 100.0);
        assert_eq!(parse_dimension("-"), 0.0);
        assert_eq!(parse_dimension("inf"), 0.0);
        assert_eq!(parse_dimension(""), 0.0);
    }

    #[test]
    fn test_property_floor_wall_ceiling_relations() {
        for &(l, w, h, o) in &[(0.0, 0.0, 0.0, 0.0), (1.0, 2.0, 3.0, 4.0), (15.5, 9.25, 8.0, 12.0)] {
            let a = DimensionCalculator::calculate_values(l, w, h, o);
            assert_eq!(a.floor_sf, l * w);
            assert_eq!(a.ceiling_sf, a.floor_sf);
            assert_eq!(a.wall_sf, 2.0 * (l + w) * h - o);
        }
    }
}
