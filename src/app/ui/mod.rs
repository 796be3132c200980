mod panels;
mod toasts;

pub(super) use panels::{draw_search_panel, draw_top_bar};
pub(super) use toasts::draw_toasts;
