//! # TUI Components
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Built each frame from the data they show:
//! - `Header`: brand, status text, "↓ New" marker
//! - `AnalyzeButton`: idle / analyzing / disabled
//! - `Message`: one chat bubble
//!
//! ### Stateful Components (Event-Driven)
//!
//! Own local state and emit higher-level events:
//! - `TextField`: single-line editor shared by the inputs below
//! - `SourcePanel`: video/document tabs, preview, analyze button
//! - `ChatInput`: question field and pending image attachment
//! - `MessageList`: scrollable conversation with layout caching
//!
//! Each file holds the component's state, events, rendering and tests.
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── header.rs
//! ├── analyze_button.rs
//! ├── text_field.rs
//! ├── source_panel.rs
//! ├── chat_input.rs
//! ├── message.rs
//! └── message_list.rs
//! ```

pub mod analyze_button;
pub mod chat_input;
mod header;
pub mod message;
pub mod message_list;
pub mod source_panel;
pub mod text_field;

pub use analyze_button::AnalyzeButton;
pub use chat_input::{ChatEvent, ChatInput};
pub use header::Header;
pub use message_list::{MessageList, MessageListState};
pub use source_panel::{SourceEvent, SourcePanel};
