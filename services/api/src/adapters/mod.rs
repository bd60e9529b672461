pub mod memory_store;
pub mod redis_store;
pub mod report_llm;

pub use memory_store::InMemoryRecordStore;
pub use redis_store::RedisRecordStore;
pub use report_llm::OpenAiReportAdapter;
