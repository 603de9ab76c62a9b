pub mod analysis;
pub mod app_config;
pub mod config;
pub mod promotion;
pub mod stores;

pub use analysis::{
    average_discount, category_average_discounts, discount, group_by_category, summarize,
    AnalysisError, AnalysisOptions, CategoryDiscount, CategoryGroup, SortDirection,
    StoreSummary, DEFAULT_DECIMAL_POINTS, DEFAULT_NO_CATEGORY_LABEL,
};
pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use promotion::{parse_promotion, Promotion, ValidationError};
pub use stores::{load_stores, StoreConfig, StoreId, StoresFile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stores file {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[source] serde_yaml::Error),

    #[error("stores config validation failed: {0}")]
    Validation(String),
}
