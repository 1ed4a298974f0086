pub mod api;
pub mod config;
pub mod context;
pub mod data_models;
pub mod errors;
pub mod generator;
pub mod rag_chain;
pub mod retriever;
pub mod shell;
