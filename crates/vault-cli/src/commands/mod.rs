pub mod credentials;
pub mod init;
pub mod tools;
