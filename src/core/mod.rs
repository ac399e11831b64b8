pub mod bundler;
pub mod selector;
