use crate::core::Pipeline;
use crate::domain::model::LoadReport;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<LoadReport> {
        let started = Instant::now();
        tracing::info!("Starting load process...");

        // Extract
        let raw = self.pipeline.extract().await?;
        tracing::debug!("Extract finished after {:?}", started.elapsed());

        // Transform
        let parsed = self.pipeline.transform(raw).await?;
        tracing::debug!("Transform finished after {:?}", started.elapsed());

        // Load
        let report = self.pipeline.load(parsed).await?;
        tracing::info!(
            "Load finished in {:?}: {} rows, {} warnings, failures: {}",
            started.elapsed(),
            report.rows_loaded(),
            report.warnings(),
            report.has_failures()
        );

        Ok(report)
    }
}
