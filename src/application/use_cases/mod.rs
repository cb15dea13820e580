pub mod column_resolver;
pub mod date_normalizer;
pub mod press_review;
pub mod report_renderer;
pub mod row_transformer;
pub mod row_validator;
pub mod summarization;
