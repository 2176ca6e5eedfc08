//! Python code sandbox
//!
//! Agent code runs in a persistent `python3` child process driven over a
//! JSON-lines protocol on stdin/stdout. The capability filter is installed
//! into the execution namespace by a `register` request; a reset replaces the
//! process, so the filter has to be registered again afterwards.

mod python;

pub use python::PythonSandbox;
