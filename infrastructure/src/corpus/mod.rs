//! Corpus adapters

mod lister;

pub use lister::LocalDirectoryLister;
