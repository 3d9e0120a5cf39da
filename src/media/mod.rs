pub mod catalog;
pub mod library;
pub mod mime;
pub mod probe;
pub mod stream;
pub mod title;
