//! Component Model
//!
//! Components are the nodes of the UI graph. Each one owns three reactive
//! stores (state, styles, attributes), an ordered child list, an event table
//! and a list of side effects. Store entries are either constants or
//! producers: closures of a [`Context`] that are re-evaluated inside
//! whichever effect reads them.
//!
//! # Building
//!
//! ```rust,ignore
//! use hipst_core::component::{dynamic, Component};
//!
//! let panel = Component::new("div")
//!     .with_state("open", false)
//!     .style("display", dynamic(|ctx| {
//!         if ctx.state().get("open").is_truthy() { "block" } else { "none" }
//!     }))
//!     .on_click(|ctx, _| ctx.state().update("open", |v| (!v.is_truthy()).into()));
//! ```
//!
//! Nothing is rendered until the tree is mounted (see [`crate::render`]) or
//! serialized (see [`crate::ssr`]).

mod value;
mod store;
mod children;
mod events;
mod context;
mod node;
mod document;
mod blueprint;

pub use value::{dynamic, Producer, Slot, Value};
pub use store::{Bag, BagKind, Store};
pub use children::{Child, ChildList};
pub use events::{Events, Handler};
pub use context::Context;
pub use node::{Component, ComponentId, SideEffect, DOCUMENT_TAG};
pub use document::Document;
pub use blueprint::{Blueprint, Define, Operation, RESERVED_OPERATIONS};
