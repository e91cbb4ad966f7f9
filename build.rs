//! Ganymede build script
//!
//! # Note
//! This build script is run immediately before the build is completed and is used to inject
//! package metadata into the build for the version report.
fn main() {
    built::write_built_file().expect("Failed to acquire build-time information");
}
