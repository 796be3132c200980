mod interaction;
mod view;

pub(super) use view::draw_graph;
