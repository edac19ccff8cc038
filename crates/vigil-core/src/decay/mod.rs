//! Memory decay: Ebbinghaus retention scoring and the cleanup policy
//! built on top of it.

pub mod policy;
pub mod retention;
