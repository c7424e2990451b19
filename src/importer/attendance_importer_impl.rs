// ==========================================
// 考勤导入引擎 - 导入编排器实现
// ==========================================
// 职责: 驱动逐行管道, 收集行级错误, 幂等落库
// 流程: 规整 → 员工解析 → 日期/时间解析 → 分类 → upsert
// 红线: 单行失败不阻断批次; 批次永远跑完并返回结果对象
// ==========================================

use crate::config::ImportConfig;
use crate::domain::attendance::{AttendanceFact, ImportBatch, ImportRunResult, RowError};
use crate::domain::types::AttendanceSource;
use crate::importer::attendance_importer_trait::AttendanceImporter;
use crate::importer::cell::{normalize_cell, CellValue, RawRow};
use crate::importer::classifier::classify;
use crate::importer::datetime_parser::{parse_date, parse_date_time};
use crate::importer::employee_resolver::EmployeeResolver;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::FileParser;
use crate::repository::attendance_repo::{AttendanceImportRepository, EmployeeStore};
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// RowOutcome - 单行处理结果
// ==========================================
// 行级状态机的终态; 失败携带 RowError, 不向外抛
enum RowOutcome {
    Imported,
    SkippedBlank,
    Failed(RowError),
}

// ==========================================
// AttendanceImporterImpl - 导入编排器
// ==========================================
pub struct AttendanceImporterImpl<R>
where
    R: EmployeeStore + AttendanceImportRepository,
{
    // 数据访问层 (员工库 + 考勤持久化)
    repo: R,

    // 运行配置 (单次运行不可变)
    config: ImportConfig,

    // 行来源协作方
    file_parser: Box<dyn FileParser>,
}

impl<R> AttendanceImporterImpl<R>
where
    R: EmployeeStore + AttendanceImportRepository,
{
    /// 创建新的 AttendanceImporter 实例
    ///
    /// # 参数
    /// - repo: 员工库与考勤事实仓储
    /// - config: 导入配置
    /// - file_parser: 文件解析器
    pub fn new(repo: R, config: ImportConfig, file_parser: Box<dyn FileParser>) -> Self {
        Self {
            repo,
            config,
            file_parser,
        }
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// 单行状态机
    ///
    /// # 返回
    /// - Ok(RowOutcome): 行级终态 (导入/空白跳过/失败)
    /// - Err: 仅员工库不可达 (批次级, 向外传播)
    async fn process_row(
        &self,
        resolver: &mut EmployeeResolver<'_>,
        row: &RawRow,
        row_number: usize,
        batch_id: &str,
        uploaded_by: Option<u64>,
    ) -> ImportResult<RowOutcome> {
        let columns = &self.config.excel_columns;

        // === 步骤 1: 单元格规整 ===
        let employee_cell = normalize_cell(row.get(&columns.employee_id));
        let date_cell = normalize_cell(row.get(&columns.date));
        let clock_in_cell = normalize_cell(row.get(&columns.clock_in));
        let clock_out_cell = normalize_cell(row.get(&columns.clock_out));

        // === 步骤 2: 空白分隔行静默跳过 ===
        if employee_cell.is_none() && date_cell.is_none() {
            debug!(row_number, "空白行, 跳过");
            return Ok(RowOutcome::SkippedBlank);
        }

        // === 步骤 3: 员工解析 ===
        let raw_employee = employee_cell
            .as_ref()
            .map(CellValue::raw_text)
            .unwrap_or_default();
        let employee = resolver
            .resolve(&raw_employee)
            .await
            .map_err(|e| ImportError::EmployeeStoreError(e.to_string()))?;
        let employee = match employee {
            Some(e) => e,
            None => {
                return Ok(RowOutcome::Failed(RowError::new(
                    row_number,
                    "employee_id",
                    raw_employee.clone(),
                    format!("员工不存在: {}", raw_employee),
                )));
            }
        };

        // === 步骤 4: 日期解析 ===
        let raw_date = date_cell.as_ref().map(CellValue::raw_text).unwrap_or_default();
        let date = match date_cell.as_ref().and_then(parse_date) {
            Some(d) => d,
            None => {
                return Ok(RowOutcome::Failed(RowError::new(
                    row_number,
                    "date",
                    raw_date.clone(),
                    format!("无法解析日期: {}", raw_date),
                )));
            }
        };

        // === 步骤 5: 打卡时间解析 ===
        // clock_in 非空但解析失败是行错误; clock_out 解析失败静默容忍
        // (视同未打下班卡), 两者口径不同是源系统既有行为
        let clock_in = match &clock_in_cell {
            Some(cell) => match parse_date_time(date, cell) {
                Some(dt) => Some(dt),
                None => {
                    return Ok(RowOutcome::Failed(RowError::new(
                        row_number,
                        "clock_in",
                        cell.raw_text(),
                        format!("无法解析上班打卡时间: {}", cell.raw_text()),
                    )));
                }
            },
            None => None,
        };
        let clock_out = clock_out_cell
            .as_ref()
            .and_then(|cell| parse_date_time(date, cell));

        // === 步骤 6: 考勤分类 ===
        let classification = classify(date, clock_in, clock_out, &self.config);

        // === 步骤 7: 幂等 upsert ===
        let fact = AttendanceFact {
            employee_id: employee.id,
            date,
            clock_in,
            clock_out,
            working_hours: classification.working_hours,
            overtime_hours: classification.overtime_hours,
            status: classification.status,
            source: AttendanceSource::Imported,
            batch_id: batch_id.to_string(),
            uploaded_by,
        };

        // 单行写入失败可归因到该行数据 (如约束违反), 降级为行错误;
        // 连接级故障在建仓时即已失败, 不会走到这里
        if let Err(e) = self.repo.upsert_attendance(&fact).await {
            warn!(row_number, error = %e, "考勤事实写入失败");
            return Ok(RowOutcome::Failed(RowError::new(
                row_number,
                "general",
                raw_employee,
                e.to_string(),
            )));
        }

        Ok(RowOutcome::Imported)
    }

    /// 单次导入运行 (所有入口最终汇聚到这里)
    #[instrument(skip(self, rows), fields(batch_id))]
    async fn run(
        &self,
        rows: Vec<RawRow>,
        uploaded_by: Option<u64>,
        file_name: Option<String>,
    ) -> ImportResult<ImportRunResult> {
        let start_time = Instant::now();
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let total_rows = rows.len();
        info!(batch_id = %batch_id, total_rows, "开始导入考勤数据");

        // 员工缓存随本次运行创建, 运行结束即废弃
        let mut resolver = EmployeeResolver::new(&self.repo);

        let mut imported = 0usize;
        let mut skipped = 0usize;
        let mut errors: Vec<RowError> = Vec::new();

        for (idx, row) in rows.iter().enumerate() {
            // 1-based 源表行号, +1 表头行 +1 起始偏移
            let row_number = idx + 2;

            match self
                .process_row(&mut resolver, row, row_number, &batch_id, uploaded_by)
                .await?
            {
                RowOutcome::Imported => imported += 1,
                RowOutcome::SkippedBlank => {}
                RowOutcome::Failed(err) => {
                    warn!(
                        row_number,
                        field = %err.field,
                        value = %err.value,
                        "行导入失败: {}", err.message
                    );
                    errors.push(err);
                    skipped += 1;
                }
            }
        }

        let elapsed = start_time.elapsed();

        // === 批次审计记录 ===
        let batch = ImportBatch {
            batch_id: batch_id.clone(),
            file_name,
            total_rows: total_rows as i32,
            imported_rows: imported as i32,
            skipped_rows: skipped as i32,
            imported_by: uploaded_by,
            imported_at: Utc::now(),
            elapsed_ms: elapsed.as_millis() as i64,
            error_report_json: if errors.is_empty() {
                None
            } else {
                serde_json::to_string(&errors).ok()
            },
        };
        self.repo
            .insert_batch(batch)
            .await
            .map_err(|e| ImportError::BatchAuditError {
                batch_id: batch_id.clone(),
                message: e.to_string(),
            })?;

        info!(
            batch_id = %batch_id,
            total = total_rows,
            imported,
            skipped,
            elapsed_ms = elapsed.as_millis(),
            "考勤数据导入完成"
        );

        Ok(ImportRunResult {
            batch_id,
            imported,
            skipped,
            errors,
            elapsed,
        })
    }

    fn file_name_of(path: &Path) -> Option<String> {
        path.file_name().and_then(|n| n.to_str()).map(String::from)
    }
}

#[async_trait::async_trait]
impl<R> AttendanceImporter for AttendanceImporterImpl<R>
where
    R: EmployeeStore + AttendanceImportRepository,
{
    async fn import_rows(
        &self,
        rows: Vec<RawRow>,
        uploaded_by: Option<u64>,
    ) -> ImportResult<ImportRunResult> {
        self.run(rows, uploaded_by, None).await
    }

    async fn import_from_file<P: AsRef<Path> + Send>(
        &self,
        file_path: P,
        uploaded_by: Option<u64>,
    ) -> ImportResult<ImportRunResult> {
        let path = file_path.as_ref();
        debug!(file = %path.display(), "解析考勤表文件");
        let rows = self.file_parser.parse_to_rows(path)?;
        self.run(rows, uploaded_by, Self::file_name_of(path)).await
    }

    /// 批量导入多个文件
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
        uploaded_by: Option<u64>,
    ) -> ImportResult<Vec<Result<ImportRunResult, String>>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量导入文件");

        let import_tasks = file_paths.into_iter().map(|path| {
            let path_str = path.as_ref().to_str().unwrap_or("unknown").to_string();
            async move {
                match self.import_from_file(path.as_ref(), uploaded_by).await {
                    Ok(result) => {
                        info!(
                            file = %path_str,
                            imported = result.imported,
                            "文件导入成功"
                        );
                        Ok(result)
                    }
                    Err(e) => {
                        warn!(file = %path_str, error = %e, "文件导入失败");
                        Err(format!("文件 {} 导入失败: {}", path_str, e))
                    }
                }
            }
        });

        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        Ok(results)
    }
}
