pub mod debounce;
pub mod init;
pub mod store;
pub mod utils;

pub use store::Store;
