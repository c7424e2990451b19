// ==========================================
// 考勤导入引擎 - 考勤领域模型
// ==========================================
// 职责: 考勤事实/导入批次/行级错误/导入结果
// 红线: AttendanceFact 按 (employee_id, date) 唯一, 由 upsert 保证
// ==========================================

use crate::domain::types::{AttendanceSource, AttendanceStatus};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ==========================================
// Employee - 员工记录 (外部员工库的规范形式)
// ==========================================
// 用途: 员工解析器的解析结果, 导入管道只读
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,                    // 员工主键
    pub email: String,              // 邮箱 (第二查找键, 精确匹配)
    pub full_name: Option<String>,  // 姓名
}

// ==========================================
// AttendanceFact - 考勤事实
// ==========================================
// 用途: 导入层写入, 薪资汇总层只读
// 对齐: attendance_fact 表, UNIQUE(employee_id, date)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceFact {
    // ===== 唯一键 =====
    pub employee_id: u64,                     // 员工
    pub date: NaiveDate,                      // 考勤日期

    // ===== 打卡时间 =====
    pub clock_in: Option<NaiveDateTime>,      // 上班打卡
    pub clock_out: Option<NaiveDateTime>,     // 下班打卡

    // ===== 派生字段 (分类器输出) =====
    pub working_hours: f64,                   // 工作小时 (>=0, 2位小数, 封顶标准工时)
    pub overtime_hours: f64,                  // 加班小时 (>=0, 2位小数)
    pub status: AttendanceStatus,             // 考勤状态

    // ===== 溯源字段 =====
    pub source: AttendanceSource,             // 数据来源
    pub batch_id: String,                     // 上传批次 ID (每次运行唯一)
    pub uploaded_by: Option<u64>,             // 上传人
}

// ==========================================
// RowError - 行级错误
// ==========================================
// 生命周期: 仅在单次导入运行内, 随结果返回, 不落库为事实
// row_number 为源表 1-based 行号 (含表头行偏移)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    pub row_number: usize, // 源表行号 (表头为第 1 行)
    pub field: String,     // 出错字段名
    pub value: String,     // 原始值
    pub message: String,   // 可读错误信息
}

impl RowError {
    pub fn new(
        row_number: usize,
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            row_number,
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }
}

// ==========================================
// ImportBatch - 导入批次审计记录
// ==========================================
// 用途: 每次运行写入一条, 供追溯与批次删除
// 对齐: import_batch 表
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,                  // 批次 ID (uuid v4)
    pub file_name: Option<String>,         // 源文件名
    pub total_rows: i32,                   // 解析到的数据行数
    pub imported_rows: i32,                // 成功导入行数
    pub skipped_rows: i32,                 // 因错误跳过的行数
    pub imported_by: Option<u64>,          // 上传人
    pub imported_at: DateTime<Utc>,        // 完成时间
    pub elapsed_ms: i64,                   // 耗时 (毫秒)
    pub error_report_json: Option<String>, // RowError 列表的 JSON 快照
}

// ==========================================
// ImportRunResult - 单次运行汇总
// ==========================================
// 生命周期: 随调用返回, 不持久化 (批次审计另见 ImportBatch)
#[derive(Debug, Clone)]
pub struct ImportRunResult {
    pub batch_id: String,      // 本次运行的批次 ID
    pub imported: usize,       // 成功导入行数
    pub skipped: usize,        // 因错误跳过的行数
    pub errors: Vec<RowError>, // 行级错误 (按源表顺序)
    pub elapsed: Duration,     // 运行耗时
}

impl ImportRunResult {
    /// 是否全部行导入成功
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_new() {
        let err = RowError::new(2, "date", "31/02/2024", "无法解析日期");
        assert_eq!(err.row_number, 2);
        assert_eq!(err.field, "date");
        assert_eq!(err.value, "31/02/2024");
    }

    #[test]
    fn test_run_result_is_clean() {
        let result = ImportRunResult {
            batch_id: "b1".to_string(),
            imported: 3,
            skipped: 0,
            errors: vec![],
            elapsed: Duration::from_millis(5),
        };
        assert!(result.is_clean());
    }
}
