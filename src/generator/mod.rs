pub mod buffers;
pub mod short_reads;

pub use buffers::IdBuffer;
pub use short_reads::ChildOperationGenerator;
