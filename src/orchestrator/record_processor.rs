//! 单条记录处理器 - 编排层
//!
//! 调用 `ResolveFlow`，失败时记录日志并写入跳过报告。
//! 单条记录的失败从不中断整个运行。

use crate::infrastructure::PdfFetcher;
use crate::models::AbstractRecord;
use crate::services::SkipWriter;
use crate::workflow::{RecordCtx, ResolveFlow, ResolvedPdf};
use tracing::{error, warn};

/// 处理单条记录，成功返回本地 PDF，失败返回 `None`
pub async fn process_record<F: PdfFetcher>(
    flow: &ResolveFlow<'_, F>,
    skip_writer: &SkipWriter,
    record: &AbstractRecord,
    ctx: &RecordCtx,
) -> Option<ResolvedPdf> {
    match flow.run(record, ctx).await {
        Ok(resolved) => Some(resolved),
        Err(e) => {
            warn!("{} ⚠️ 跳过: {}", ctx, e);
            if let Err(write_err) = skip_writer.write(record, &e.to_string()).await {
                error!("{} 写入跳过报告失败: {}", ctx, write_err);
            }
            None
        }
    }
}
