// Parsers for raw inventory and playbook documents

pub mod document;
mod inventory;
mod playbook;

pub use document::{parse_document, scalar_str, FileRole, RawFile};
pub use inventory::interpret_inventory;
pub use playbook::{interpret_playbook, PlaybookDoc};
