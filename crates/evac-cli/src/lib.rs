//! Library half of the `evac-cli` binary: kept separate from `main.rs` so
//! `check`/`solution`/`bench` are exercisable from integration tests
//! without spawning the compiled binary, the same bin/lib split the wider
//! example pack uses to keep CLI logic testable (e.g. `freddiehaddad-
//! oxidized`'s `core-*` crates behind its thin `ox-bin`).

pub mod bench;
pub mod check;
pub mod cli;
pub mod solution;
