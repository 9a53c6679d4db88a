mod input;
mod layout;
mod render;
mod state;
mod util;

pub use input::handle_key;
pub use input::handle_mouse;
pub use layout::compute_layout;
pub use render::draw;
pub use state::{UiMode, UiState};
pub use util::{accepts_record, player_label, sync_mode};
