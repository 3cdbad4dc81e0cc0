pub mod in_memory;
pub mod rocksdb;
pub mod sqlite;
