pub mod llm;
pub mod translator;
