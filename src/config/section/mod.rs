//! Configuration section definitions.
//!
//! Each module corresponds to a section in `prerender.toml`:
//!
//! | Module   | TOML Section | Purpose                              |
//! |----------|--------------|--------------------------------------|
//! | `build`  | `[build]`    | Browser and server build commands    |
//! | `routes` | `[routes]`   | Explicit routes and routes file      |
//! | `render` | `[render]`   | Worker command, count, timeout       |

mod build;
mod render;
mod routes;

pub use build::BuildSectionConfig;
pub use render::RenderSectionConfig;
pub use routes::RoutesSectionConfig;
