pub mod db;
pub mod inference_llm;

pub use db::DbAdapter;
pub use inference_llm::GeminiInferenceAdapter;
