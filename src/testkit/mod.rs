//! Test support shared by unit tests, integration tests and benches.
//!
//! - [`helpers`]: descriptor universes, class-file bytes and jar archives
//! - [`assertions`]: `assert_result_ok!` and friends, exported at the crate root

pub mod assertions;
pub mod helpers;

pub use helpers::{
    chain_universe, class_with_members, isolated_universe, write_archive, ClassFileBuilder,
};
