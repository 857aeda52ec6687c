pub mod split;
pub mod train;
pub mod util;
