pub mod jsonl_repo;
pub mod mem_repo;
