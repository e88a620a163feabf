//! Hipst Core
//!
//! This crate provides the core runtime for the Hipst UI framework.
//! It implements:
//!
//! - Fine-grained reactive primitives (track, trigger, effects)
//! - A component model with reactive state, style and attribute stores
//! - An incremental renderer that keeps a host tree in sync without a
//!   virtual-tree diff
//! - One-shot server-side string rendering
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: Dependency registry and effect runtime
//! - `component`: Component nodes, stores, blueprints and documents
//! - `render`: Host abstraction, in-memory DOM and the mount pipeline
//! - `ssr`: String rendering for server output
//!
//! # Example
//!
//! ```rust,ignore
//! use hipst_core::component::{dynamic, Component};
//! use hipst_core::render::{DomNode, MemoryDom, Renderer};
//!
//! let panel = Component::new("div")
//!     .with_state("open", false)
//!     .display(dynamic(|ctx| {
//!         if ctx.state().get("open").is_truthy() { "block" } else { "none" }
//!     }))
//!     .text("Hello");
//!
//! let renderer = Renderer::new(MemoryDom::new());
//! let body = DomNode::element("body");
//! let node = renderer.mount(&panel, &body);
//!
//! panel.state().set("open", true);
//! // node.style("display") is now Some("block")
//! ```

pub mod reactive;
pub mod component;
pub mod render;
pub mod ssr;
pub mod config;
pub mod error;

pub use component::{dynamic, Blueprint, Component, Context, Document, Slot, Value};
pub use config::RenderConfig;
pub use error::{Error, Result};
pub use reactive::{effect, stop, track, trigger, untracked, Effect};
pub use render::{Host, Renderer};
pub use ssr::render_to_string;
