//! Mutation API: component values, parameters and simulation instructions.
//!
//! Everything here works on the in-memory [`Schematic`]. Nothing touches the
//! filesystem; see [`crate::AscEditor`] for loading and saving.

use std::ops::Range;

use log::{debug, info, warn};
use regex::{Regex, RegexBuilder};

use crate::eng::SpiceValue;
use crate::error::{EditorError, Result};
use crate::geometry::Text;
use crate::schematic::{Attribute, Component, Schematic, ATTR_INST_NAME, ATTR_VALUE};

/// Analysis commands of which at most one active instance may exist.
pub const UNIQUE_SIMULATION_DOT_INSTRUCTIONS: &[&str] = &[".AC", ".DC", ".TRAN", ".NOISE", ".TF"];

/// Keyword that introduces parameter directives.
pub const PARAM_COMMAND: &str = ".PARAM";

/// Font size given to directives created by the editor.
pub const NEW_DIRECTIVE_SIZE: i32 = 2;

const NEW_DIRECTIVE_ALIGNMENT: &str = "Left";

/// Pattern locating `name=value` (or `name value`) inside a `.param` body.
fn param_regex(name: &str) -> Result<Regex> {
    let pattern = format!(
        r"\b(?P<name>{})\s*[= ]\s*(?P<value>[\w*/.+\-{{}}()%]*)",
        regex::escape(name)
    );
    Ok(RegexBuilder::new(&pattern).case_insensitive(true).build()?)
}

/// Upper-cased first token of a directive, e.g. `.TRAN`.
fn command_of(text: &str) -> String {
    text.split_whitespace()
        .next()
        .unwrap_or_default()
        .to_uppercase()
}

/// Every record is one line, so text carried into a record cannot hold a
/// line break.
fn single_line(what: &str, text: &str) -> Result<()> {
    if text.contains(['\n', '\r']) {
        return Err(EditorError::MultiLine(what.to_string()));
    }
    Ok(())
}

/// Byte offset where the body of a directive starts, past its command.
fn body_offset(text: &str) -> usize {
    let start = text.len() - text.trim_start().len();
    text[start..]
        .find(char::is_whitespace)
        .map_or(text.len(), |end| start + end)
}

fn is_unique_command(command: &str) -> bool {
    UNIQUE_SIMULATION_DOT_INSTRUCTIONS.contains(&command)
}

impl Schematic {
    // Components -------------------------------------------------------------

    pub fn get_component(&self, reference: &str) -> Result<&Component> {
        self.components.get(reference).ok_or_else(|| {
            debug!("Component {reference} not found in ASC file");
            EditorError::ComponentNotFound(reference.to_string())
        })
    }

    pub fn get_component_mut(&mut self, reference: &str) -> Result<&mut Component> {
        self.components
            .get_mut(reference)
            .ok_or_else(|| EditorError::ComponentNotFound(reference.to_string()))
    }

    /// References of all components whose first character is one of
    /// `prefixes`. `"*"` returns every component.
    pub fn get_components(&self, prefixes: &str) -> Vec<&str> {
        self.components
            .keys()
            .map(String::as_str)
            .filter(|reference| {
                prefixes == "*"
                    || reference
                        .chars()
                        .next()
                        .is_some_and(|first| prefixes.contains(first))
            })
            .collect()
    }

    /// Insert a component, replacing any existing one with the same reference.
    pub fn add_component(&mut self, component: Component) -> Result<Option<Component>> {
        if component.reference.trim().is_empty() {
            return Err(EditorError::InvalidReference(component.reference));
        }
        single_line("Component reference", &component.reference)?;
        single_line("Component symbol", &component.symbol)?;
        for (name, attribute) in &component.attributes {
            single_line("Attribute name", name)?;
            if let Attribute::Value(value) = attribute {
                single_line(&format!("Attribute {name}"), value)?;
            }
        }
        info!("Adding component {}", component.reference);
        Ok(self
            .components
            .insert(component.reference.clone(), component))
    }

    /// Remove a component. Wires and flags touching its pins are left alone.
    pub fn remove_component(&mut self, reference: &str) -> Result<Component> {
        let removed = self
            .components
            .shift_remove(reference)
            .ok_or_else(|| EditorError::ComponentNotFound(reference.to_string()))?;
        info!("Component {reference} removed");
        Ok(removed)
    }

    pub fn get_component_value(&self, reference: &str) -> Result<&str> {
        self.get_component(reference)?
            .value()
            .ok_or_else(|| EditorError::MissingValue(reference.to_string()))
    }

    /// Set the `Value` attribute. Numbers are written in engineering notation.
    pub fn set_component_value(
        &mut self,
        reference: &str,
        value: impl Into<SpiceValue>,
    ) -> Result<()> {
        let value = value.into().render();
        single_line("Component value", &value)?;
        let component = self.get_component_mut(reference)?;
        match component.attributes.get_mut(ATTR_VALUE) {
            Some(Attribute::Value(current)) => {
                *current = value;
                info!("Component {reference} updated to {current}");
                Ok(())
            }
            _ => Err(EditorError::MissingValue(reference.to_string())),
        }
    }

    pub fn set_component_values<I, K, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<SpiceValue>,
    {
        for (reference, value) in values {
            self.set_component_value(reference.as_ref(), value)?;
        }
        Ok(())
    }

    /// Replace the symbol a component is drawn with. The symbol is not checked.
    pub fn set_element_model(&mut self, reference: &str, model: impl Into<String>) -> Result<()> {
        let model = model.into();
        single_line("Component symbol", &model)?;
        let component = self.get_component_mut(reference)?;
        component.symbol = model;
        info!("Component {reference} updated to {}", component.symbol);
        Ok(())
    }

    pub fn get_component_attribute(&self, reference: &str, attribute: &str) -> Result<&str> {
        self.get_component(reference)?
            .attribute(attribute)
            .ok_or_else(|| EditorError::AttributeNotFound {
                reference: reference.to_string(),
                attribute: attribute.to_string(),
            })
    }

    /// Set (or add) a plain attribute. `InstName` cannot be changed this way.
    pub fn set_component_attribute(
        &mut self,
        reference: &str,
        attribute: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        if attribute == ATTR_INST_NAME {
            return Err(EditorError::RenameNotSupported(reference.to_string()));
        }
        let value = value.into();
        single_line("Attribute name", attribute)?;
        single_line(&format!("Attribute {attribute}"), &value)?;
        let component = self.get_component_mut(reference)?;
        component
            .attributes
            .insert(attribute.to_string(), Attribute::Value(value));
        Ok(())
    }

    // Parameters -------------------------------------------------------------

    /// Index of the `.param` directive defining `name` and the byte range of
    /// its value. Only the body after the command is searched.
    fn find_parameter(&self, name: &str) -> Result<Option<(usize, Range<usize>)>> {
        let regex = param_regex(name)?;
        for (idx, directive) in self.directives.iter().enumerate() {
            if !directive.is_instruction() || !command_of(&directive.text).starts_with(PARAM_COMMAND)
            {
                continue;
            }
            let offset = body_offset(&directive.text);
            let body = &directive.text[offset..];
            if let Some(value) = regex.captures(body).and_then(|c| c.name("value")) {
                let span = value.range();
                return Ok(Some((idx, span.start + offset..span.end + offset)));
            }
        }
        Ok(None)
    }

    pub fn get_parameter(&self, name: &str) -> Result<String> {
        match self.find_parameter(name)? {
            Some((idx, span)) => Ok(self.directives[idx].text[span].to_string()),
            None => Err(EditorError::ParameterNotFound(name.to_string())),
        }
    }

    /// Update a parameter in place, or append a new `.param` directive.
    pub fn set_parameter(&mut self, name: &str, value: impl Into<SpiceValue>) -> Result<()> {
        let value = value.into().render();
        single_line("Parameter name", name)?;
        single_line(&format!("Parameter {name}"), &value)?;
        match self.find_parameter(name)? {
            Some((idx, span)) => {
                debug!("Parameter {name} found in ASC file, updating it");
                self.directives[idx].text.replace_range(span, &value);
                info!("Parameter {name} updated to {value}");
            }
            None => {
                debug!("Parameter {name} not found in ASC file, adding it");
                let text = format!(".param {name}={value}");
                self.append_directive(text);
                info!("Parameter {name} added with value {value}");
            }
        }
        Ok(())
    }

    pub fn set_parameters<I, K, V>(&mut self, params: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<SpiceValue>,
    {
        for (name, value) in params {
            self.set_parameter(name.as_ref(), value)?;
        }
        Ok(())
    }

    // Instructions -----------------------------------------------------------

    fn append_directive(&mut self, text: String) {
        let coord = self.free_text_position();
        let directive =
            Text::new(coord, text, NEW_DIRECTIVE_SIZE).with_alignment(NEW_DIRECTIVE_ALIGNMENT);
        self.directives.push(directive);
    }

    /// Add a simulation instruction such as `.tran 10m` or `.meas ...`.
    ///
    /// Analysis commands listed in [`UNIQUE_SIMULATION_DOT_INSTRUCTIONS`]
    /// replace an existing directive of the same command in place.
    pub fn add_instruction(&mut self, instruction: &str) -> Result<()> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(EditorError::EmptyInstruction);
        }
        single_line("Instruction", instruction)?;
        let command = command_of(instruction);
        if command.starts_with(PARAM_COMMAND) {
            return Err(EditorError::ParamInstruction(instruction.to_string()));
        }

        if is_unique_command(&command) {
            if let Some(existing) = self
                .directives
                .iter_mut()
                .find(|d| d.is_instruction() && command_of(&d.text) == command)
            {
                info!("Instruction {} replaced by {instruction}", existing.text);
                existing.text = instruction.to_string();
                return Ok(());
            }
        }

        self.append_directive(instruction.to_string());
        info!("Instruction {instruction} added");
        Ok(())
    }

    pub fn add_instructions<I, S>(&mut self, instructions: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for instruction in instructions {
            self.add_instruction(instruction.as_ref())?;
        }
        Ok(())
    }

    /// Remove every directive containing `instruction` verbatim.
    ///
    /// Fails with [`EditorError::InstructionNotFound`] if nothing matched.
    /// Blank text matches nothing and is rejected.
    pub fn remove_instruction(&mut self, instruction: &str) -> Result<usize> {
        if instruction.trim().is_empty() {
            return Err(EditorError::EmptyInstruction);
        }
        let before = self.directives.len();
        self.directives.retain(|d| {
            let hit = d.text.contains(instruction);
            if hit {
                info!("Instruction {} removed", d.text);
            }
            !hit
        });
        let removed = before - self.directives.len();
        if removed == 0 {
            return Err(EditorError::InstructionNotFound(instruction.to_string()));
        }
        Ok(removed)
    }

    /// Remove every directive matching a case-insensitive regular expression
    /// anchored at the start of the directive text. Returns how many were
    /// removed; zero is not an error.
    pub fn remove_instruction_matching(&mut self, pattern: &str) -> Result<usize> {
        if pattern.trim().is_empty() {
            return Err(EditorError::EmptyInstruction);
        }
        let regex = RegexBuilder::new(&format!("^(?:{pattern})"))
            .case_insensitive(true)
            .build()?;
        let before = self.directives.len();
        self.directives.retain(|d| {
            let hit = regex.is_match(&d.text);
            if hit {
                info!("Instruction {} removed", d.text);
            }
            !hit
        });
        let removed = before - self.directives.len();
        if removed == 0 {
            warn!("Instructions matching \"{pattern}\" not found");
        }
        Ok(removed)
    }
}
