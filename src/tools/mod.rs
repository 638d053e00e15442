pub mod code;
pub mod linkage;
pub mod manifest;
pub mod parse;
pub mod reference;
pub mod session;
pub mod typescript;
