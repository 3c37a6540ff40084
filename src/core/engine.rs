use crate::core::{ExportSummary, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct ExportEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> ExportEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&mut self) -> Result<ExportSummary> {
        tracing::info!("Starting export...");
        self.monitor.log_stats("Start", 0);

        match self.pipeline.export().await {
            Ok(summary) => {
                tracing::info!(
                    "Exported {} records ({} bytes, {} newlines replaced) in {}ms",
                    summary.records_written,
                    summary.bytes_written,
                    summary.newlines_replaced,
                    summary.elapsed().num_milliseconds()
                );
                self.monitor.log_stats("Export", summary.records_written);
                Ok(summary)
            }
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                self.monitor.log_stats("Failed", 0);
                Err(e)
            }
        }
    }
}
