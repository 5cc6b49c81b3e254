/// 获取当前 UTC 时间戳（毫秒）
///
/// 全栈统一使用 Unix millis，repository 层只接收 `i64`。
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
