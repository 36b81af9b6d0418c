pub use self::{bird::*, field_config::*, pipe::*};

pub(crate) mod bird;
pub(crate) mod field_config;
pub(crate) mod pipe;
