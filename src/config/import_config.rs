// ==========================================
// 考勤导入引擎 - 导入配置
// ==========================================
// 职责: 工时阈值 / 迟到宽限 / 班次开始时间 / 列名映射
// 红线: 单次运行内不可变; 不含配置写入
// ==========================================

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

// ==========================================
// ExcelColumnMap - 列名映射
// ==========================================
// 用途: 逻辑字段 → 源表表头名
// 默认为恒等映射 (表头即逻辑字段名)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcelColumnMap {
    pub employee_id: String,
    pub date: String,
    pub clock_in: String,
    pub clock_out: String,
}

impl Default for ExcelColumnMap {
    fn default() -> Self {
        Self {
            employee_id: "employee_id".to_string(),
            date: "date".to_string(),
            clock_in: "clock_in".to_string(),
            clock_out: "clock_out".to_string(),
        }
    }
}

// ==========================================
// ImportConfig - 导入运行配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// 标准日工时 (小时), 超出部分计为加班
    pub working_hours_per_day: f64,

    /// 半天阈值 (小时), 出勤工时低于此值判为半天
    pub half_day_hours: f64,

    /// 迟到宽限 (分钟), 超出班次开始时间此宽限判为迟到
    pub late_threshold_minutes: i64,

    /// 默认班次开始时间 "HH:MM"
    pub default_shift_start: String,

    /// 源表列名映射
    pub excel_columns: ExcelColumnMap,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            working_hours_per_day: 8.0,
            half_day_hours: 4.0,
            late_threshold_minutes: 15,
            default_shift_start: "09:00".to_string(),
            excel_columns: ExcelColumnMap::default(),
        }
    }
}

impl ImportConfig {
    /// 解析班次开始时间
    ///
    /// 配置非法时回退为 09:00, 不阻断导入
    pub fn shift_start_time(&self) -> NaiveTime {
        NaiveTime::parse_from_str(&self.default_shift_start, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&self.default_shift_start, "%H:%M:%S"))
            .unwrap_or_else(|_| NaiveTime::from_hms_opt(9, 0, 0).unwrap())
    }

    /// 从 JSON 文本加载配置 (缺省字段取默认值)
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ImportConfig::default();
        assert_eq!(config.working_hours_per_day, 8.0);
        assert_eq!(config.half_day_hours, 4.0);
        assert_eq!(config.late_threshold_minutes, 15);
        assert_eq!(
            config.shift_start_time(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
        assert_eq!(config.excel_columns.employee_id, "employee_id");
    }

    #[test]
    fn test_from_json_partial() {
        let config = ImportConfig::from_json(
            r#"{"working_hours_per_day": 7.5, "default_shift_start": "08:30"}"#,
        )
        .unwrap();
        assert_eq!(config.working_hours_per_day, 7.5);
        assert_eq!(
            config.shift_start_time(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
        // 未给出的字段取默认值
        assert_eq!(config.half_day_hours, 4.0);
    }

    #[test]
    fn test_invalid_shift_start_falls_back() {
        let config = ImportConfig {
            default_shift_start: "not-a-time".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.shift_start_time(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap()
        );
    }
}
