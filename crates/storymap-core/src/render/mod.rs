pub mod mindmap;
pub mod outline;

pub use mindmap::{build_mindmap, CollapseState, Mindmap, MindmapEdge, MindmapNode};
pub use outline::render_outline;
