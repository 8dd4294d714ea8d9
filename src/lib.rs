pub mod cache;
pub mod config;
pub mod error;
pub mod fragment;
pub mod generator;
pub mod inspector;
pub mod model;
pub mod scanner;
pub mod type_mapper;
pub mod widget_builder;

pub use error::{Error, Result};
