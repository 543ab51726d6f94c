//! HCS-1 file codec: large payloads split across ordered chunk messages,
//! with the integrity hash recorded in the topic memo.

pub mod chunk;
pub mod codec;
pub mod service;

pub use chunk::HcsFileChunkMessage;
pub use codec::{build_file_from_chunk_messages, get_file_chunk_messages, FileMetadata};
pub use service::HcsFileService;
