pub mod segmenter;
pub mod validator;

pub use segmenter::{is_and_one, segment_game};
pub use validator::validate_possessions;
