// ==========================================
// 考勤导入引擎 - 配置层
// ==========================================
// 职责: 导入运行配置 (阈值 + 列名映射)
// 红线: 配置对单次运行不可变, 由调用方提供
// ==========================================

pub mod import_config;

// 重导出核心配置类型
pub use import_config::{ExcelColumnMap, ImportConfig};
