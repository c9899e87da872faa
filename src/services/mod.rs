pub mod discovery;
pub mod enrichment;
pub mod provider_directory;
pub mod recommendations;
pub mod tmdb;

#[cfg(test)]
pub(crate) mod testing;
