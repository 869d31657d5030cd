/// Document write and workflow interface
pub mod document;
/// Reference data lookup interface
pub mod reference;
