//! Database models and queries

pub mod authors;
pub mod books;
pub mod init;
pub mod settings;
pub mod tokens;

pub use authors::*;
pub use books::*;
pub use init::*;
pub use settings::*;
pub use tokens::*;
