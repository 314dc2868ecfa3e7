//! Integration tests for the full load -> filter -> apply -> report flow.
//!
//! Each test builds a decompiled tree and a snippet repository in a temp
//! directory and drives the library the way the CLI does.

mod scenarios;
mod workspace;
