//! Reading, editing and writing LTspice `.asc` schematics.
//!
//! ```no_run
//! use spicekit_asc::AscEditor;
//!
//! let mut editor = AscEditor::open("rc_filter.asc")?;
//! editor.set_component_value("R1", 11000)?;
//! editor.set_parameter("Rl", "22k")?;
//! editor.add_instruction(".tran 10m")?;
//! editor.save("rc_filter_edited.asc")?;
//! # Ok::<(), spicekit_asc::EditorError>(())
//! ```

pub mod edit;
pub mod editor;
pub mod eng;
pub mod error;
pub mod geometry;
pub mod parser;
pub mod placement;
pub mod schematic;
pub mod writer;

pub use edit::{PARAM_COMMAND, UNIQUE_SIMULATION_DOT_INSTRUCTIONS};
pub use editor::AscEditor;
pub use eng::{format_eng, SpiceValue};
pub use error::{EditorError, ParseError};
pub use geometry::{DirectiveKind, HorAlign, Line, Point, Rotation, Text, VerAlign};
pub use parser::parse;
pub use schematic::{Attribute, Component, Schematic};
pub use writer::to_asc_string;
