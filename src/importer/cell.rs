// ==========================================
// 考勤导入引擎 - 单元格值与行规整
// ==========================================
// 职责: 源表单元格的统一表示 + TRIM / NULL 标准化
// 红线: 规整为纯函数, 不产生错误
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// ==========================================
// CellValue - 原始单元格值
// ==========================================
// Excel 会把日期/时间存成序列数, CSV 永远是文本;
// 解析行为必须两者同时兼容, 故保留数值形态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl CellValue {
    /// 文本形式 (用于错误报告中的原始值)
    pub fn raw_text(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw_text())
    }
}

/// 源表一行: 表头名 → 单元格值
pub type RawRow = HashMap<String, CellValue>;

// ==========================================
// 规整函数 (Row Normalizer)
// ==========================================

/// 规整单个单元格值
///
/// - 缺失 / Empty / 空白文本 → None
/// - 文本 → TRIM 后保留
/// - 数值 → 原样保留
pub fn normalize_cell(value: Option<&CellValue>) -> Option<CellValue> {
    match value {
        None | Some(CellValue::Empty) => None,
        Some(CellValue::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(CellValue::Text(trimmed.to_string()))
            }
        }
        Some(CellValue::Number(n)) => Some(CellValue::Number(*n)),
    }
}
