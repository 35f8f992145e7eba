pub mod memory;

pub use memory::MemoryDb;
