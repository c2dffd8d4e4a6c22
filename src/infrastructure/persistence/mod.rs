pub mod memory_repository;
pub mod postgres_repository;

pub use memory_repository::InMemoryStoreRepository;
pub use postgres_repository::PostgresStoreRepository;
