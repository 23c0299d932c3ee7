pub mod build;

#[cfg(test)]
mod tests;
