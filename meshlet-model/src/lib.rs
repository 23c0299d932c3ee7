pub mod meshlet;
pub mod shape;
