pub mod use_cases;

pub use use_cases::press_review::{PressReview, PressReviewUseCase, ReviewOptions};
pub use use_cases::summarization::SummarizeUseCase;
