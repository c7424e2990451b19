// ==========================================
// 考勤导入引擎 - 日期/时间解析器
// ==========================================
// 职责: 异构日期时间表示 → 规范 NaiveDate / NaiveDateTime
// 支持: Excel 序列数 (1900 纪元) + 多格式文本 (按序回退)
// 红线: 解析失败一律返回 None, 不抛错; 由编排器决定是否构成行错误
// ==========================================

use crate::importer::cell::CellValue;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Excel 1900 纪元基准日 (序列数 1 = 1900-01-01)
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// 序列数判定下限: 大于 40000 (约 2009 年之后) 才按序列日期处理,
/// 避免把普通数字误读成日期
const SERIAL_DATE_MIN: f64 = 40000.0;

/// 文本日期格式, 按序尝试, 首个命中即生效
///
/// 顺序即语义: "03/04/2024" 命中 DD/MM/YYYY 读作 4 月 3 日而非 3 月 4 日,
/// 与历史数据口径一致, 不要调整顺序
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// 文本时间格式, 按序尝试
///
/// chrono 的 %p 大小写不敏感, 所以 "9:30 AM"/"9:30 am" 等写法
/// 都落在带空格与不带空格两个变体上
const TIME_FORMATS: &[&str] = &[
    "%H:%M:%S",
    "%H:%M",
    "%I:%M %p",
    "%I:%M%p",
    "%I:%M:%S %p",
    "%I:%M:%S%p",
];

/// 自由格式日期时间回退, 文本在所有时间格式之后最后一搏
const DATETIME_FALLBACK_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

fn excel_epoch() -> NaiveDate {
    let (y, m, d) = EXCEL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Excel 序列数 → 日期 (丢弃小数部分)
fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    let days = serial.trunc() as i64;
    excel_epoch().checked_add_signed(Duration::days(days))
}

/// Excel 序列数 → 日期时间 (小数部分为当日时间)
fn serial_to_date_time(serial: f64) -> Option<NaiveDateTime> {
    let date = serial_to_date(serial)?;
    let secs = (serial.fract() * 86_400.0).round() as u32;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(secs.min(86_399), 0)?;
    Some(date.and_time(time))
}

/// 一天的小数 → 当日时间 (精确到分钟)
fn fraction_to_time(fraction: f64) -> Option<NaiveTime> {
    if !(0.0..1.0).contains(&fraction) {
        return None;
    }
    let total_minutes = (fraction * 1_440.0).round() as u32;
    let total_minutes = total_minutes.min(1_439);
    NaiveTime::from_hms_opt(total_minutes / 60, total_minutes % 60, 0)
}

// ==========================================
// parse_date - 日期解析
// ==========================================

/// 解析单元格为日期
///
/// - 数值 (或数值形态的文本) > 40000 → 按 1900 纪元序列数换算
/// - 文本 → 依 DATE_FORMATS 按序尝试
/// - 其余 → None
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) => {
            if *n > SERIAL_DATE_MIN {
                serial_to_date(*n)
            } else {
                None
            }
        }
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            // CSV 导出常把序列数存成文本
            if let Ok(n) = trimmed.parse::<f64>() {
                if n > SERIAL_DATE_MIN {
                    return serial_to_date(n);
                }
            }
            for fmt in DATE_FORMATS {
                if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
                    return Some(d);
                }
            }
            None
        }
    }
}

// ==========================================
// parse_date_time - 时间/日期时间解析
// ==========================================

/// 解析单元格为日期时间, 以 `date` 为日期上下文
///
/// - 数值 < 1 → 一天的小数, 与 `date` 组合
/// - 数值 > 40000 → 完整序列日期时间 (自带日期, 有意忽略传入的 `date`)
/// - 文本 → 依 TIME_FORMATS 按序尝试后与 `date` 组合,
///   最后按 DATETIME_FALLBACK_FORMATS 做自由格式解析
/// - 其余 → None
pub fn parse_date_time(date: NaiveDate, value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::Empty => None,
        CellValue::Number(n) => parse_numeric_date_time(date, *n),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            if let Ok(n) = trimmed.parse::<f64>() {
                return parse_numeric_date_time(date, n);
            }
            for fmt in TIME_FORMATS {
                if let Ok(t) = NaiveTime::parse_from_str(trimmed, fmt) {
                    return Some(date.and_time(t));
                }
            }
            for fmt in DATETIME_FALLBACK_FORMATS {
                if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                    return Some(dt);
                }
            }
            if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(trimmed) {
                return Some(dt.naive_local());
            }
            None
        }
    }
}

fn parse_numeric_date_time(date: NaiveDate, n: f64) -> Option<NaiveDateTime> {
    if n < 1.0 {
        fraction_to_time(n).map(|t| date.and_time(t))
    } else if n > SERIAL_DATE_MIN {
        serial_to_date_time(n)
    } else {
        // 1..=40000 的数值无法判定语义
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_iso() {
        assert_eq!(
            parse_date(&CellValue::Text("2024-03-01".to_string())),
            Some(date(2024, 3, 1))
        );
    }

    #[test]
    fn test_parse_date_serial_number() {
        // Excel 序列数 45000 = 2023-03-15 (1900 纪元)
        assert_eq!(
            parse_date(&CellValue::Number(45000.0)),
            Some(date(2023, 3, 15))
        );
        // 文本形态的序列数同样处理
        assert_eq!(
            parse_date(&CellValue::Text("45000".to_string())),
            Some(date(2023, 3, 15))
        );
    }

    #[test]
    fn test_parse_date_small_number_rejected() {
        assert_eq!(parse_date(&CellValue::Number(123.0)), None);
    }

    #[test]
    fn test_parse_date_ambiguous_prefers_dd_mm() {
        // 格式顺序决定歧义读法: DD/MM 优先于 MM/DD
        assert_eq!(
            parse_date(&CellValue::Text("03/04/2024".to_string())),
            Some(date(2024, 4, 3))
        );
    }

    #[test]
    fn test_parse_date_mm_dd_fallback() {
        // DD/MM 无法成立 (13 月) 时回退到 MM/DD
        assert_eq!(
            parse_date(&CellValue::Text("12/25/2024".to_string())),
            Some(date(2024, 12, 25))
        );
    }

    #[test]
    fn test_parse_date_invalid_calendar_date() {
        assert_eq!(parse_date(&CellValue::Text("31/02/2024".to_string())), None);
    }

    #[test]
    fn test_parse_date_empty() {
        assert_eq!(parse_date(&CellValue::Empty), None);
        assert_eq!(parse_date(&CellValue::Text("   ".to_string())), None);
    }

    #[test]
    fn test_parse_date_time_hh_mm() {
        let d = date(2024, 3, 1);
        assert_eq!(
            parse_date_time(d, &CellValue::Text("09:05".to_string())),
            Some(d.and_hms_opt(9, 5, 0).unwrap())
        );
        assert_eq!(
            parse_date_time(d, &CellValue::Text("18:05:30".to_string())),
            Some(d.and_hms_opt(18, 5, 30).unwrap())
        );
    }

    #[test]
    fn test_parse_date_time_am_pm() {
        let d = date(2024, 3, 1);
        assert_eq!(
            parse_date_time(d, &CellValue::Text("6:05 PM".to_string())),
            Some(d.and_hms_opt(18, 5, 0).unwrap())
        );
        assert_eq!(
            parse_date_time(d, &CellValue::Text("6:05pm".to_string())),
            Some(d.and_hms_opt(18, 5, 0).unwrap())
        );
        assert_eq!(
            parse_date_time(d, &CellValue::Text("9:05 am".to_string())),
            Some(d.and_hms_opt(9, 5, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_date_time_day_fraction() {
        // 0.375 * 24h = 09:00
        let d = date(2024, 3, 1);
        assert_eq!(
            parse_date_time(d, &CellValue::Number(0.375)),
            Some(d.and_hms_opt(9, 0, 0).unwrap())
        );
        assert_eq!(
            parse_date_time(d, &CellValue::Text("0.375".to_string())),
            Some(d.and_hms_opt(9, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_date_time_full_serial_ignores_context_date() {
        // 45000.5 = 2023-03-15 12:00, 序列数自带日期
        let d = date(2024, 3, 1);
        assert_eq!(
            parse_date_time(d, &CellValue::Number(45000.5)),
            Some(date(2023, 3, 15).and_hms_opt(12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_date_time_mid_range_number_rejected() {
        let d = date(2024, 3, 1);
        assert_eq!(parse_date_time(d, &CellValue::Number(1234.0)), None);
    }

    #[test]
    fn test_parse_date_time_freeform_fallback() {
        let d = date(2024, 3, 1);
        assert_eq!(
            parse_date_time(d, &CellValue::Text("2024-03-02 08:30:00".to_string())),
            Some(date(2024, 3, 2).and_hms_opt(8, 30, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_date_time_garbage() {
        let d = date(2024, 3, 1);
        assert_eq!(
            parse_date_time(d, &CellValue::Text("not a time".to_string())),
            None
        );
        assert_eq!(parse_date_time(d, &CellValue::Empty), None);
    }
}
