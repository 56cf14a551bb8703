pub use advisor::*;
pub use view::*;

mod advisor;
mod view;
