//! # Voxel World Generator Entry Point
//!
//! Generates a region of the world and logs what was produced.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json]
//! ```

fn main() {
    voxel_worldgen::run();
}
