// ==========================================
// 考勤导入引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口, 屏蔽数据库细节
// 约束: 所有查询使用参数化, 防止 SQL 注入
// ==========================================

pub mod attendance_repo;
pub mod attendance_repo_impl;

// 重导出核心仓储
pub use attendance_repo::{AttendanceImportRepository, EmployeeStore};
pub use attendance_repo_impl::AttendanceImportRepositoryImpl;
