//! Rendering Pipeline
//!
//! Mounting turns a component tree into a live host tree kept in sync by
//! effects. The platform sits behind the [`Host`] trait; [`MemoryDom`] is the
//! bundled in-memory implementation.
//!
//! ```rust,ignore
//! use hipst_core::component::{dynamic, Component};
//! use hipst_core::render::{DomNode, MemoryDom, Renderer};
//!
//! let counter = Component::new("p")
//!     .with_state("count", 1)
//!     .child(dynamic(|ctx| ctx.state().get("count")));
//!
//! let renderer = Renderer::new(MemoryDom::new());
//! let container = DomNode::element("body");
//! renderer.mount(&counter, &container);
//!
//! counter.state().set("count", 2); // the text node now reads "2"
//! ```

mod host;
mod record;
mod mount;
mod dom;

pub use host::{Event, Host, Listener};
pub use mount::{attribute_text, style_text, Renderer};
pub use dom::{DomNode, MemoryDom};
