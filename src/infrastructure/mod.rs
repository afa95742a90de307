pub mod audio;
pub mod llm;
pub mod observability;
pub mod persistence;
pub mod scenarios;
pub mod speech;
pub mod storage;
