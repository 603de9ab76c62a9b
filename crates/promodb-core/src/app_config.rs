use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub log_level: String,
    pub stores_path: PathBuf,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub page_size: u32,
    pub max_pages: usize,
    /// `0` means every store is fetched at once.
    pub max_concurrent_stores: usize,
}
