// ==========================================
// 考勤导入引擎 - 领域类型定义
// ==========================================
// 职责: 考勤状态与数据来源枚举
// 序列化格式: snake_case (与数据库一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 考勤状态 (Attendance Status)
// ==========================================
// 红线: 状态由分类器统一判定, 其它模块只读
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present, // 正常出勤
    Absent,  // 缺勤
    Late,    // 迟到
    HalfDay, // 半天出勤
}

impl AttendanceStatus {
    /// 数据库文本列使用的标识符
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Late => "late",
            AttendanceStatus::HalfDay => "half_day",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 数据来源 (Attendance Source)
// ==========================================
// imported: 导入管道写入
// manual: 人工补录 (本引擎之外的路径)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceSource {
    Imported,
    Manual,
}

impl AttendanceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceSource::Imported => "imported",
            AttendanceSource::Manual => "manual",
        }
    }
}

impl fmt::Display for AttendanceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::HalfDay).unwrap(),
            "\"half_day\""
        );
        assert_eq!(AttendanceStatus::Late.to_string(), "late");
    }

    #[test]
    fn test_source_serialization() {
        assert_eq!(
            serde_json::to_string(&AttendanceSource::Imported).unwrap(),
            "\"imported\""
        );
    }
}
