pub mod documents;

pub use documents as document_entity;
