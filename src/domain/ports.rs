use crate::core::loader::LoadMode;
use crate::db::Table;
use crate::domain::model::LoadReport;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    /// Human-readable location of `path`, for warnings.
    fn describe(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn database_url(&self) -> &str;
    fn data_dir(&self) -> &str;
    fn load_mode(&self) -> LoadMode;
    /// Source file name for a table, relative to `data_dir`.
    fn source_file(&self, table: Table) -> String;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Raw: Send;
    type Parsed: Send;

    async fn extract(&self) -> Result<Self::Raw>;
    async fn transform(&self, raw: Self::Raw) -> Result<Self::Parsed>;
    async fn load(&self, parsed: Self::Parsed) -> Result<LoadReport>;
}
