pub mod entities;
pub mod normalizer;
pub mod use_cases;
