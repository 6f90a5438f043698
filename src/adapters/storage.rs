use crate::core::{ConfigProvider, Storage};
use crate::utils::error::Result;
use std::path::Path;

/// Reads source files from a directory on the local disk.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    /// Rooted at the configured data directory.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.data_dir().to_string())
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    fn describe(&self, path: &str) -> String {
        Path::new(&self.base_path).join(path).display().to_string()
    }
}
