//! Hiero HCS: The topic feed contract and everything that turns a raw
//! topic feed into ordered, validated messages: the per-message pipeline,
//! the pull resolver, the streaming listener, and the HCS-1 file codec.

pub mod error;
pub mod feed;
pub mod file;
pub mod listener;
pub mod memory;
pub mod message;
pub mod pipeline;
pub mod resolver;
pub mod topic;
pub mod transaction;

pub use error::HcsError;
pub use feed::{MessageStream, SubmitAck, TopicFeed, TopicInfo, TopicOptions, TopicQuery};
pub use file::{HcsFileChunkMessage, HcsFileService};
pub use listener::{HcsTopicListener, SubscriptionHandle};
pub use memory::InMemoryTopicFeed;
pub use message::{HcsMessage, HcsMessageWithResponseMetadata};
pub use pipeline::{InvalidMessageHandler, MessageFilter, MessagePipeline};
pub use resolver::HcsMessageResolver;
pub use topic::HcsTopicService;
pub use transaction::HcsMessageTransaction;
