mod central_panel;
mod color_swatch;
mod tools_panel;
mod yaml_panel;

pub use central_panel::central_panel;
pub use tools_panel::tools_panel;
pub use yaml_panel::yaml_panel;
