mod client;

pub use client::{OpenAIClient, OPENAI_API_BASE, GOOGLE_OPENAI_API_BASE};
