pub mod cms;
pub mod limiter;
pub mod upstream;
pub mod utils;
