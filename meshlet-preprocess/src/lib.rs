pub mod attribute;
pub mod error;
pub mod indices;
pub mod meshlet;
pub mod process;
pub mod reorder;

#[cfg(test)]
mod test_meshes;
