pub mod graph;
pub mod parser;
pub mod status;
pub mod check;
pub mod config;
pub mod layout;
pub mod test_helpers;

pub use graph::{Edge, Graph, GraphError, Point, Status, StatusLookup, Task};
pub use parser::{ParseError, load_graph, save_graph};
pub use status::{EffectiveStatus, resolve_all, resolve_status};
pub use check::{check_all, check_cycles, check_orphans, CheckResult};
pub use config::{Config, DagConfig, ForceConfig, LayoutConfig};
pub use layout::{
    Bounds, LayoutError, LayoutStrategy, Positions, Simulation, compute_layout, layout_dag,
    resolve_positions,
};
