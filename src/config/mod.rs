pub mod proc_loader;
pub mod proc_validator;
pub mod provider;
pub mod service;
pub mod settings;
