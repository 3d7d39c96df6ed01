//! Line-oriented reader for `.asc` schematic files.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::error::ParseError;
use crate::geometry::{DirectiveKind, Line, Point, Rotation, Text};
use crate::schematic::{
    window_key, Attribute, Component, Schematic, ATTR_INST_NAME, SUPPORTED_VERSION,
};

/// `TEXT x y align size (!|;)text`
static TEXT_REGEX: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(r"^TEXT\s+(-?\d+)\s+(-?\d+)\s+(\S+)\s+(\d+)\s*(?P<type>[!;])(?P<text>.*)$")
        .case_insensitive(true)
        .build()
        .expect("TEXT pattern is valid")
});

/// Parser state: the model being built plus the currently open `SYMBOL`.
pub struct Parser<'a> {
    input: &'a str,
    schematic: Schematic,
    /// Open component and the line its `SYMBOL` record was on
    open: Option<(Component, usize)>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Parser {
            input: input.strip_prefix('\u{feff}').unwrap_or(input),
            schematic: Schematic::new(),
            open: None,
        }
    }

    /// Consume the whole input. Nothing is returned unless every record parsed.
    pub fn parse(mut self) -> Result<Schematic, ParseError> {
        for (idx, line) in self.input.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            self.parse_line(line, line_no)?;
        }
        self.commit()?;
        Ok(self.schematic)
    }

    fn parse_line(&mut self, line: &str, line_no: usize) -> Result<(), ParseError> {
        let (keyword, rest) = split_field(line);
        match keyword {
            "SYMBOL" => self.parse_symbol(rest, line_no),
            "WINDOW" => self.parse_window(rest, line_no),
            "SYMATTR" => self.parse_symattr(rest, line_no),
            "TEXT" => self.parse_text(line, line_no),
            "WIRE" => self.parse_wire(rest, line_no),
            "FLAG" => self.parse_flag(rest, line_no),
            "Version" => self.parse_version(rest, line_no),
            "SHEET" => {
                self.schematic.sheet = rest.trim().to_string();
                Ok(())
            }
            _ => Err(ParseError::UnsupportedPrimitive {
                line: line_no,
                record: line.trim_end().to_string(),
            }),
        }
    }

    fn parse_symbol(&mut self, rest: &str, line_no: usize) -> Result<(), ParseError> {
        let fields = expect_fields::<4>(rest, "SYMBOL", line_no)?;
        self.commit()?;

        let position = Point::new(
            parse_int(fields[1], "SYMBOL", line_no)?,
            parse_int(fields[2], "SYMBOL", line_no)?,
        );
        let rotation =
            Rotation::from_str(fields[3]).map_err(|e| ParseError::InvalidRotation {
                line: line_no,
                token: e.0,
            })?;

        let component = Component {
            symbol: fields[0].to_string(),
            position,
            rotation,
            ..Default::default()
        };
        self.open = Some((component, line_no));
        Ok(())
    }

    fn parse_window(&mut self, rest: &str, line_no: usize) -> Result<(), ParseError> {
        let fields = expect_fields::<5>(rest, "WINDOW", line_no)?;
        let coord = Point::new(
            parse_int(fields[1], "WINDOW", line_no)?,
            parse_int(fields[2], "WINDOW", line_no)?,
        );
        let size = parse_int(fields[4], "WINDOW", line_no)?;
        let window = Text::new(coord, fields[0], size).with_alignment(fields[3]);

        let (component, _) = self.open.as_mut().ok_or(ParseError::OutsideSymbol {
            line: line_no,
            keyword: "WINDOW",
        })?;
        component
            .attributes
            .insert(window_key(fields[0]), Attribute::Window(window));
        Ok(())
    }

    fn parse_symattr(&mut self, rest: &str, line_no: usize) -> Result<(), ParseError> {
        let (component, _) = self.open.as_mut().ok_or(ParseError::OutsideSymbol {
            line: line_no,
            keyword: "SYMATTR",
        })?;
        let (name, value) = split_field(rest);
        if name.is_empty() {
            return Err(ParseError::Malformed {
                line: line_no,
                keyword: "SYMATTR",
                reason: "missing attribute name".to_string(),
            });
        }
        let value = value.trim();
        if name == ATTR_INST_NAME {
            component.reference = value.to_string();
        } else {
            component
                .attributes
                .insert(name.to_string(), Attribute::Value(value.to_string()));
        }
        Ok(())
    }

    fn parse_text(&mut self, line: &str, line_no: usize) -> Result<(), ParseError> {
        let caps = TEXT_REGEX
            .captures(line.trim())
            .ok_or_else(|| ParseError::Malformed {
                line: line_no,
                keyword: "TEXT",
                reason: "expected `TEXT x y align size !text` or `;text`".to_string(),
            })?;

        let coord = Point::new(
            parse_int(&caps[1], "TEXT", line_no)?,
            parse_int(&caps[2], "TEXT", line_no)?,
        );
        let size = parse_int(&caps[4], "TEXT", line_no)?;
        let kind = if &caps["type"] == "!" {
            DirectiveKind::Instruction
        } else {
            DirectiveKind::Comment
        };
        let directive = Text::directive(coord, caps["text"].trim(), size.unsigned_abs(), kind)
            .with_alignment(&caps[3]);
        self.schematic.directives.push(directive);
        Ok(())
    }

    fn parse_wire(&mut self, rest: &str, line_no: usize) -> Result<(), ParseError> {
        let fields = expect_fields::<4>(rest, "WIRE", line_no)?;
        let mut coords = [0i32; 4];
        for (slot, field) in coords.iter_mut().zip(fields) {
            *slot = parse_int(field, "WIRE", line_no)?;
        }
        self.schematic
            .wires
            .push(Line::new((coords[0], coords[1]), (coords[2], coords[3])));
        Ok(())
    }

    fn parse_flag(&mut self, rest: &str, line_no: usize) -> Result<(), ParseError> {
        let (x, rest) = split_field(rest);
        let (y, label) = split_field(rest);
        let label = label.trim();
        if label.is_empty() {
            return Err(ParseError::Malformed {
                line: line_no,
                keyword: "FLAG",
                reason: "expected `FLAG x y label`".to_string(),
            });
        }
        let coord = Point::new(
            parse_int(x, "FLAG", line_no)?,
            parse_int(y, "FLAG", line_no)?,
        );
        self.schematic.labels.push(Text::new(coord, label, 0));
        Ok(())
    }

    fn parse_version(&mut self, rest: &str, line_no: usize) -> Result<(), ParseError> {
        let [version] = expect_fields::<1>(rest, "Version", line_no)?;
        match version.parse::<u32>() {
            Ok(v) if v == SUPPORTED_VERSION => {
                self.schematic.version = v;
                Ok(())
            }
            _ => Err(ParseError::UnsupportedVersion {
                line: line_no,
                version: version.to_string(),
            }),
        }
    }

    /// Move the open component into the component map.
    fn commit(&mut self) -> Result<(), ParseError> {
        let Some((component, line)) = self.open.take() else {
            return Ok(());
        };
        if component.reference.is_empty() {
            return Err(ParseError::MissingInstName { line });
        }
        if self.schematic.components.contains_key(&component.reference) {
            return Err(ParseError::DuplicateReference {
                line,
                reference: component.reference,
            });
        }
        log::trace!(
            "Parsed component {} ({}) at line {line}",
            component.reference,
            component.symbol
        );
        self.schematic
            .components
            .insert(component.reference.clone(), component);
        Ok(())
    }
}

/// Split off the first whitespace-delimited field. The remainder keeps its
/// inner spacing but loses the separating whitespace.
fn split_field(s: &str) -> (&str, &str) {
    let s = s.trim_start();
    match s.find(char::is_whitespace) {
        Some(idx) => (&s[..idx], s[idx..].trim_start()),
        None => (s, ""),
    }
}

fn expect_fields<'s, const N: usize>(
    rest: &'s str,
    keyword: &'static str,
    line: usize,
) -> Result<[&'s str; N], ParseError> {
    let fields: Vec<&str> = rest.split_whitespace().collect();
    fields.try_into().map_err(|fields: Vec<&str>| ParseError::Malformed {
        line,
        keyword,
        reason: format!("expected {N} fields, found {}", fields.len()),
    })
}

fn parse_int(field: &str, keyword: &'static str, line: usize) -> Result<i32, ParseError> {
    field.parse().map_err(|_| ParseError::Malformed {
        line,
        keyword,
        reason: format!("`{field}` is not an integer"),
    })
}

/// Parse the full text of an `.asc` file.
pub fn parse(input: &str) -> Result<Schematic, ParseError> {
    log::trace!("Parsing ASC schematic from {} bytes of input", input.len());
    let result = Parser::new(input).parse();
    match &result {
        Ok(sch) => log::trace!(
            "Parsed {} components, {} wires, {} flags, {} directives",
            sch.components.len(),
            sch.wires.len(),
            sch.labels.len(),
            sch.directives.len()
        ),
        Err(e) => log::trace!("Failed to parse ASC schematic: {e}"),
    }
    result
}

impl FromStr for Schematic {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
