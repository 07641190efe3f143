pub mod count;
pub mod init_config;
pub mod merge;
pub mod predict;
pub mod preprocess;
pub mod trajectory;
