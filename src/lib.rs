// src/lib.rs

//! Job Digest Library

pub mod dispatch;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
