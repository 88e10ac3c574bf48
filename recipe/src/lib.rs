pub mod argument;
pub mod build_config;
pub mod build_spec;
pub mod copy_rule;
pub mod error;
pub mod health_check;

pub use argument::*;
pub use build_config::*;
pub use build_spec::*;
pub use copy_rule::*;
pub use error::*;
pub use health_check::*;
