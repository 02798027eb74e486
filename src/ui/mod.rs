pub mod results;
pub mod window;
