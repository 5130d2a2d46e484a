pub mod indent;
pub mod project;
pub mod quotation;
pub mod report;
pub mod user;
