pub mod error;
pub mod issue;
pub mod llm_config;
pub mod record;
pub mod schema;
pub mod table;
