//! Canvas primitives shared by every record of an `.asc` schematic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Integer canvas coordinates
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A wire segment. Endpoints are kept in file order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub v1: Point,
    pub v2: Point,
}

impl Line {
    pub fn new(v1: impl Into<Point>, v2: impl Into<Point>) -> Self {
        Self {
            v1: v1.into(),
            v2: v2.into(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Decode a symbolic alignment token into its (horizontal, vertical) pair.
///
/// The file format only defines six tokens. Anything else falls back to
/// left/bottom instead of failing.
pub fn decode_alignment(token: &str) -> (HorAlign, VerAlign) {
    match token {
        "Left" => (HorAlign::Left, VerAlign::Center),
        "Center" => (HorAlign::Center, VerAlign::Center),
        "Right" => (HorAlign::Right, VerAlign::Center),
        "VTop" => (HorAlign::Center, VerAlign::Top),
        "VCenter" => (HorAlign::Center, VerAlign::Center),
        "VBottom" => (HorAlign::Left, VerAlign::Bottom),
        _ => (HorAlign::Left, VerAlign::Bottom),
    }
}

/// Encode an alignment pair back into its symbolic token.
///
/// Only six of the nine pairs have a token of their own, so this is not the
/// exact inverse of [`decode_alignment`] for every pair.
pub fn encode_alignment(horizontal: HorAlign, vertical: VerAlign) -> &'static str {
    match vertical {
        VerAlign::Center => match horizontal {
            HorAlign::Right => "Right",
            HorAlign::Center => "Center",
            HorAlign::Left => "Left",
        },
        VerAlign::Top => "VTop",
        VerAlign::Bottom => "VBottom",
    }
}

/// Whether a `TEXT` record is a simulation instruction (`!`) or a comment (`;`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectiveKind {
    #[default]
    Instruction,
    Comment,
}

/// Positioned text: net labels, WINDOW attributes and directives.
///
/// For directives the sign of `size` carries the directive type: positive
/// is an active instruction, negative an inert comment. The magnitude is
/// the font size. A zero size has no sign, so `kind` decides.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub coord: Point,
    pub text: String,
    pub size: i32,
    pub h_align: HorAlign,
    pub v_align: VerAlign,
    #[serde(default)]
    pub kind: DirectiveKind,
}

impl Text {
    /// New text. A negative `size` makes it a comment.
    pub fn new(coord: impl Into<Point>, text: impl Into<String>, size: i32) -> Self {
        let kind = if size < 0 {
            DirectiveKind::Comment
        } else {
            DirectiveKind::Instruction
        };
        Self {
            coord: coord.into(),
            text: text.into(),
            size,
            kind,
            ..Default::default()
        }
    }

    /// Directive of the given kind with font size `magnitude`, sign applied.
    pub fn directive(
        coord: impl Into<Point>,
        text: impl Into<String>,
        magnitude: u32,
        kind: DirectiveKind,
    ) -> Self {
        let magnitude = i32::try_from(magnitude).unwrap_or(i32::MAX);
        let size = match kind {
            DirectiveKind::Instruction => magnitude,
            DirectiveKind::Comment => -magnitude,
        };
        Self {
            kind,
            ..Self::new(coord, text, size)
        }
    }

    /// Builder-style alignment from a symbolic token.
    pub fn with_alignment(mut self, token: &str) -> Self {
        self.set_alignment(token);
        self
    }

    pub fn set_alignment(&mut self, token: &str) {
        let (h, v) = decode_alignment(token);
        self.h_align = h;
        self.v_align = v;
    }

    pub fn alignment(&self) -> &'static str {
        encode_alignment(self.h_align, self.v_align)
    }

    /// True for directives that are simulation instructions rather than comments.
    pub fn is_instruction(&self) -> bool {
        !self.is_comment()
    }

    pub fn is_comment(&self) -> bool {
        match self.size {
            0 => self.kind == DirectiveKind::Comment,
            size => size < 0,
        }
    }
}

/// Placement rotation of a symbol instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rotation::R0 => "R0",
            Rotation::R90 => "R90",
            Rotation::R180 => "R180",
            Rotation::R270 => "R270",
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }
}

/// Error returned when a rotation token is not one of `R0`, `R90`, `R180`, `R270`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid rotation value: {0}")]
pub struct InvalidRotation(pub String);

impl FromStr for Rotation {
    type Err = InvalidRotation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "R0" => Ok(Rotation::R0),
            "R90" => Ok(Rotation::R90),
            "R180" => Ok(Rotation::R180),
            "R270" => Ok(Rotation::R270),
            other => Err(InvalidRotation(other.to_string())),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_alignment_table() {
        assert_eq!(decode_alignment("Left"), (HorAlign::Left, VerAlign::Center));
        assert_eq!(
            decode_alignment("Center"),
            (HorAlign::Center, VerAlign::Center)
        );
        assert_eq!(decode_alignment("Right"), (HorAlign::Right, VerAlign::Center));
        assert_eq!(decode_alignment("VTop"), (HorAlign::Center, VerAlign::Top));
        assert_eq!(
            decode_alignment("VCenter"),
            (HorAlign::Center, VerAlign::Center)
        );
        assert_eq!(decode_alignment("VBottom"), (HorAlign::Left, VerAlign::Bottom));
    }

    #[test]
    fn test_unknown_alignment_falls_back_to_left_bottom() {
        assert_eq!(decode_alignment("Top"), (HorAlign::Left, VerAlign::Bottom));
        assert_eq!(decode_alignment("VLeft"), (HorAlign::Left, VerAlign::Bottom));
        assert_eq!(decode_alignment(""), (HorAlign::Left, VerAlign::Bottom));
    }

    #[test]
    fn test_encode_alignment() {
        assert_eq!(encode_alignment(HorAlign::Left, VerAlign::Center), "Left");
        assert_eq!(encode_alignment(HorAlign::Center, VerAlign::Center), "Center");
        assert_eq!(encode_alignment(HorAlign::Right, VerAlign::Center), "Right");
        assert_eq!(encode_alignment(HorAlign::Center, VerAlign::Top), "VTop");
        assert_eq!(encode_alignment(HorAlign::Right, VerAlign::Top), "VTop");
        assert_eq!(encode_alignment(HorAlign::Left, VerAlign::Bottom), "VBottom");
    }

    #[test]
    fn test_alignment_is_stable_after_one_pass() {
        for token in ["Left", "Center", "Right", "VTop", "VCenter", "VBottom", "Bogus"] {
            let (h, v) = decode_alignment(token);
            let encoded = encode_alignment(h, v);
            assert_eq!(decode_alignment(encoded), (h, v), "token {token}");
        }
    }

    #[test]
    fn test_rotation_tokens() {
        for rot in [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270] {
            assert_eq!(rot.as_str().parse::<Rotation>().unwrap(), rot);
        }
        assert_eq!(
            "M90".parse::<Rotation>(),
            Err(InvalidRotation("M90".to_string()))
        );
        assert_eq!(Rotation::R270.degrees(), 270);
    }

    #[test]
    fn test_zero_size_uses_kind() {
        let comment = Text::directive((0, 0), ".step param R 1 10 1", 0, DirectiveKind::Comment);
        assert_eq!(comment.size, 0);
        assert!(comment.is_comment());

        let active = Text::directive((0, 0), ".op", 0, DirectiveKind::Instruction);
        assert!(active.is_instruction());

        let sized = Text::directive((0, 0), "note", 2, DirectiveKind::Comment);
        assert_eq!(sized.size, -2);
    }

    #[test]
    fn test_text_sign_channel() {
        let directive = Text::new((0, 0), ".tran 1m", 2);
        assert!(directive.is_instruction());
        let comment = Text::new((0, 0), "a note", -2);
        assert!(comment.is_comment());
    }
}
