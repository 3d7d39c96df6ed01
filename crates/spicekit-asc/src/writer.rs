//! Serializes a [`Schematic`] back into `.asc` records.

use std::fmt::{self, Write};

use crate::geometry::Text;
use crate::schematic::{Attribute, Component, Schematic, ATTR_INST_NAME};

/// Terminator written after every record.
pub const END_LINE_TERM: &str = "\n";

fn write_component(out: &mut impl Write, component: &Component) -> fmt::Result {
    write!(
        out,
        "SYMBOL {} {} {} {}{END_LINE_TERM}",
        component.symbol, component.position.x, component.position.y, component.rotation
    )?;
    for window in component.windows() {
        write!(
            out,
            "WINDOW {} {} {} {} {}{END_LINE_TERM}",
            window.text,
            window.coord.x,
            window.coord.y,
            window.alignment(),
            window.size
        )?;
    }
    write!(
        out,
        "SYMATTR {ATTR_INST_NAME} {}{END_LINE_TERM}",
        component.reference
    )?;
    for (name, value) in &component.attributes {
        if let Attribute::Value(value) = value {
            write!(out, "SYMATTR {name} {value}{END_LINE_TERM}")?;
        }
    }
    Ok(())
}

fn write_directive(out: &mut impl Write, directive: &Text) -> fmt::Result {
    // Sign of size, or kind when zero
    let tag = if directive.is_comment() { ';' } else { '!' };
    write!(
        out,
        "TEXT {} {} {} {} {tag}{}{END_LINE_TERM}",
        directive.coord.x,
        directive.coord.y,
        directive.alignment(),
        directive.size.unsigned_abs(),
        directive.text
    )
}

fn write_schematic(out: &mut impl Write, sch: &Schematic) -> fmt::Result {
    write!(out, "Version {}{END_LINE_TERM}", sch.version)?;
    write!(out, "SHEET {}{END_LINE_TERM}", sch.sheet)?;
    for wire in &sch.wires {
        write!(
            out,
            "WIRE {} {} {} {}{END_LINE_TERM}",
            wire.v1.x, wire.v1.y, wire.v2.x, wire.v2.y
        )?;
    }
    for flag in &sch.labels {
        write!(
            out,
            "FLAG {} {} {}{END_LINE_TERM}",
            flag.coord.x, flag.coord.y, flag.text
        )?;
    }
    for component in sch.components.values() {
        write_component(out, component)?;
    }
    for directive in &sch.directives {
        write_directive(out, directive)?;
    }
    Ok(())
}

/// Render the schematic as `.asc` text.
pub fn to_asc_string(sch: &Schematic) -> String {
    sch.to_string()
}

impl fmt::Display for Schematic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_schematic(f, self)
    }
}
