// Public modules
pub mod chat;
pub mod completion;
pub mod message;
pub mod model;

// Re-exports
pub use chat::{ChatReply, ChatRequest, ErrorBody};
pub use completion::{
    ChoiceMessage, CompletionChoice, CompletionMessage, CompletionRequest, CompletionResponse,
    CompletionRole,
};
pub use message::{Message, MessageId, Sender};
pub use model::{KnownModel, Model, ModelCatalog, ModelOption};
