pub mod document;
pub mod letter;
pub mod resume;
