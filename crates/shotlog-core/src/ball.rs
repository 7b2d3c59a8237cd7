//! Ball tokens and their derived appearance.

use kurbo::Point;
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a ball placed on the table.
pub type BallId = Uuid;

/// Number of the cue ball.
pub const CUE_BALL: u8 = 0;
/// Highest ball number in a standard set.
pub const MAX_BALL_NUMBER: u8 = 15;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color from a packed `0xRRGGBB` value.
    pub const fn rgb(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 255)
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Format as `#RRGGBB`, ignoring alpha.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

const YELLOW: SerializableColor = SerializableColor::rgb(0xFDB927);
const BLUE: SerializableColor = SerializableColor::rgb(0x0046AD);
const RED: SerializableColor = SerializableColor::rgb(0xC8102E);
const PURPLE: SerializableColor = SerializableColor::rgb(0x552583);
const ORANGE: SerializableColor = SerializableColor::rgb(0xFF6F00);
const GREEN: SerializableColor = SerializableColor::rgb(0x006847);
const MAROON: SerializableColor = SerializableColor::rgb(0x8B4513);

/// Base color of a ball. Stripes share the color of `number - 8`.
pub fn ball_color(number: u8) -> SerializableColor {
    match number {
        CUE_BALL => SerializableColor::white(),
        8 => SerializableColor::black(),
        n => match (n - 1) % 8 {
            0 => YELLOW,
            1 => BLUE,
            2 => RED,
            3 => PURPLE,
            4 => ORANGE,
            5 => GREEN,
            _ => MAROON,
        },
    }
}

/// Check whether a ball number exists in a standard set.
pub fn is_valid_number(number: u8) -> bool {
    number <= MAX_BALL_NUMBER
}

/// Presentation attributes of a ball, derived from its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallStyle {
    /// Fill color.
    pub color: SerializableColor,
    /// Whether the ball is drawn with a stripe (9-15).
    pub striped: bool,
    /// Color of the number label, `None` for the cue ball.
    pub label_color: Option<SerializableColor>,
    /// Border color used while the ball is selected.
    pub selection_border: SerializableColor,
}

impl BallStyle {
    pub fn for_number(number: u8) -> Self {
        let color = ball_color(number);
        let label_color = match number {
            CUE_BALL => None,
            7 => Some(SerializableColor::white()),
            n if n > 8 => Some(SerializableColor::white()),
            _ => Some(SerializableColor::black()),
        };
        // Dark border on the light balls, light border everywhere else.
        let is_light = color == SerializableColor::white() || color == YELLOW;
        Self {
            color,
            striped: number >= 9,
            label_color,
            selection_border: if is_light {
                SerializableColor::black()
            } else {
                SerializableColor::white()
            },
        }
    }
}

/// Snapshot of the identity of a ball, carried by path annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallAppearance {
    pub number: u8,
    pub color: SerializableColor,
    pub striped: bool,
}

impl BallAppearance {
    pub fn for_number(number: u8) -> Self {
        let style = BallStyle::for_number(number);
        Self {
            number,
            color: style.color,
            striped: style.striped,
        }
    }
}

/// A numbered ball placed on the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub(crate) id: BallId,
    pub(crate) number: u8,
    /// Center in table-local coordinates.
    pub position: Point,
}

impl Ball {
    pub(crate) fn new(number: u8, position: Point) -> Self {
        Self {
            id: Uuid::new_v4(),
            number,
            position,
        }
    }

    pub fn id(&self) -> BallId {
        self.id
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn style(&self) -> BallStyle {
        BallStyle::for_number(self.number)
    }

    pub fn appearance(&self) -> BallAppearance {
        BallAppearance::for_number(self.number)
    }

    /// Check if a point lies on this ball's disc, widened by `tolerance`.
    pub fn hit_test(&self, point: Point, radius: f64, tolerance: f64) -> bool {
        let reach = radius + tolerance;
        (point - self.position).hypot2() <= reach * reach
    }
}
