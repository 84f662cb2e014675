pub mod apply;
pub mod check;
mod helper;
pub mod ignore;
pub mod init;
pub mod externalize;
pub mod internalize;
pub mod rename_key;
pub mod show;
