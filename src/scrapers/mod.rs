pub mod base;
pub mod http;
pub mod table;
pub mod normalize;
