//! Model providers

mod chat_completions;

pub use chat_completions::ChatCompletionsInvoker;
