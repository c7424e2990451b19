// ==========================================
// 考勤导入引擎 - 导入 Trait
// ==========================================
// 职责: 定义考勤导入主接口（不包含实现）
// ==========================================

use crate::domain::attendance::ImportRunResult;
use crate::importer::cell::RawRow;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::path::Path;

// ==========================================
// AttendanceImporter Trait
// ==========================================
// 用途: 考勤导入主接口
// 实现者: AttendanceImporterImpl
#[async_trait]
pub trait AttendanceImporter: Send + Sync {
    /// 导入一批已解析的行记录
    ///
    /// # 参数
    /// - rows: 数据行 (表头行已由行来源消费), 顺序与源文件一致
    /// - uploaded_by: 上传人 (写入每条考勤事实)
    ///
    /// # 返回
    /// - Ok(ImportRunResult): 批次汇总, 行级错误随结果返回
    /// - Err: 仅批次级错误 (数据库不可达等); 单行失败不会走到这里
    ///
    /// # 导入流程（逐行状态机）
    /// 1. 单元格规整 (TRIM / NULL 标准化)
    /// 2. 空白分隔行静默跳过
    /// 3. 员工解析 (带单次运行缓存)
    /// 4. 日期解析 (序列数 + 多格式回退)
    /// 5. 打卡时间解析 (clock_out 失败静默容忍)
    /// 6. 考勤分类
    /// 7. 幂等 upsert, 键 (employee_id, date)
    async fn import_rows(
        &self,
        rows: Vec<RawRow>,
        uploaded_by: Option<u64>,
    ) -> ImportResult<ImportRunResult>;

    /// 从考勤表文件导入考勤数据
    ///
    /// # 参数
    /// - file_path: 考勤表文件路径（.xlsx/.xls/.csv, 由行来源按扩展名分派）
    async fn import_from_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        uploaded_by: Option<u64>,
    ) -> ImportResult<ImportRunResult>;

    /// 批量导入多个文件
    ///
    /// # 说明
    /// - 每个文件是一次独立运行: 独立批次 ID, 独立员工缓存
    /// - 单个文件失败不影响其它文件
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
        uploaded_by: Option<u64>,
    ) -> ImportResult<Vec<Result<ImportRunResult, String>>>;
}
