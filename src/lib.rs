pub mod config;
pub mod config_options;
pub mod error;
pub mod macros;
pub mod path;
pub mod transform;
pub mod value;
pub mod raw {
    pub mod token;
}
pub mod serde {
    pub mod de;
    pub mod ser;
}
pub mod merge {
    pub mod array;
    pub mod clone;
    pub mod document;
    pub mod field;
    pub mod freeze;
    pub mod literal;
    pub mod merged_object;
    pub mod object;
    pub mod resolve;
    pub mod substitution;
    pub mod value;
    pub mod view;
}

#[doc(hidden)]
pub use indexmap;

pub type Result<T> = std::result::Result<T, error::Error>;

#[cfg(test)]
#[ctor::ctor]
unsafe fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
