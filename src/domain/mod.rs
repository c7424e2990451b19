// ==========================================
// 考勤导入引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体与类型
// 红线: 不含数据访问逻辑, 不含导入管道逻辑
// ==========================================

pub mod attendance;
pub mod types;

// 重导出核心类型
pub use attendance::{
    AttendanceFact, Employee, ImportBatch, ImportRunResult, RowError,
};
pub use types::{AttendanceSource, AttendanceStatus};
