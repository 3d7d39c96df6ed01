//! Picks a canvas location for newly created directives.

use crate::geometry::Point;
use crate::schematic::Schematic;

/// Vertical distance between consecutive lines of text on the canvas.
pub const TEXT_LINE_INCREMENT: i32 = 24;

/// The two edges of the drawing's bounding box the heuristic needs.
#[derive(Debug, Default, Clone, Copy)]
struct Bounds {
    min_x: Option<i32>,
    max_y: Option<i32>,
}

impl Bounds {
    fn include(&mut self, p: Point) {
        self.min_x = Some(self.min_x.map_or(p.x, |v| v.min(p.x)));
        self.max_y = Some(self.max_y.map_or(p.y, |v| v.max(p.y)));
    }
}

impl Schematic {
    /// Point just below the lowest drawing element, at the leftmost x.
    ///
    /// The sheet origin only seeds the minimum corner. This does not check
    /// for overlap with text extending below its anchor.
    pub fn free_text_position(&self) -> Point {
        let mut bounds = Bounds::default();

        let points = self
            .wires
            .iter()
            .flat_map(|w| [w.v1, w.v2])
            .chain(self.labels.iter().map(|l| l.coord))
            .chain(self.directives.iter().map(|d| d.coord))
            .chain(self.components.values().map(|c| c.position));
        for p in points {
            bounds.include(p);
        }

        let origin = self.sheet_origin();
        let min_x = match (bounds.min_x, origin) {
            (Some(x), Some(o)) => x.min(o.x),
            (Some(x), None) => x,
            (None, Some(o)) => o.x,
            (None, None) => 0,
        };
        let max_y = bounds
            .max_y
            .or(origin.map(|o| o.y))
            .unwrap_or_default();

        Point::new(min_x, max_y.saturating_add(TEXT_LINE_INCREMENT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Line, Rotation, Text};
    use crate::schematic::Component;

    fn base() -> Schematic {
        Schematic {
            sheet: "1 880 680".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_anchor_below_lowest_element() {
        let mut sch = base();
        sch.wires.push(Line::new((-64, 16), (96, 160)));
        sch.labels.push(Text::new((32, 208), "0", 0));
        sch.components.insert(
            "R1".to_string(),
            Component::new("res", "R1", (-80, 48), Rotation::R0),
        );
        assert_eq!(sch.free_text_position(), Point::new(-80, 232));
    }

    #[test]
    fn test_directives_count() {
        let mut sch = base();
        sch.wires.push(Line::new((0, 0), (16, 16)));
        sch.directives.push(Text::new((-8, 300), ".op", 2));
        assert_eq!(sch.free_text_position(), Point::new(-8, 324));
    }

    #[test]
    fn test_wire_second_endpoint_y_counts() {
        let mut sch = base();
        sch.wires.push(Line::new((0, 0), (0, 400)));
        assert_eq!(sch.free_text_position(), Point::new(0, 424));
    }

    #[test]
    fn test_sheet_seeds_minimum_only() {
        let mut sch = base();
        sch.sheet = "1 -200 900".to_string();
        sch.wires.push(Line::new((0, 0), (64, 64)));
        assert_eq!(sch.free_text_position(), Point::new(-200, 88));
    }

    #[test]
    fn test_anchor_clamps_at_canvas_edge() {
        let mut sch = base();
        sch.wires.push(Line::new((0, 0), (0, i32::MAX - 4)));
        assert_eq!(sch.free_text_position(), Point::new(0, i32::MAX));
    }

    #[test]
    fn test_empty_schematic() {
        assert_eq!(base().free_text_position(), Point::new(880, 704));

        let mut sch = base();
        sch.sheet = String::new();
        assert_eq!(sch.free_text_position(), Point::new(0, 24));
    }
}
