//! Implements utilities to create color values.

use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// An sRGB color with channels in `0.0..=1.0` and an optional alpha.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: Option<f64>,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: None }
    }

    pub const fn with_alpha(self, a: f64) -> Self {
        Self { a: Some(a), ..self }
    }

    pub fn rgb(&self) -> (f64, f64, f64) {
        (self.r, self.g, self.b)
    }

    pub fn rgba(&self) -> (f64, f64, f64, f64) {
        (self.r, self.g, self.b, self.a.unwrap_or(1.0))
    }

    pub fn alpha(&self) -> f64 {
        self.a.unwrap_or(1.0)
    }

    pub fn has_alpha(&self) -> bool {
        self.a.is_some()
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for Color {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let re = Regex::new(
            r"^#(?:([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})([0-9a-fA-F]{2})?|([0-9a-fA-F])([0-9a-fA-F])([0-9a-fA-F]))$",
        )
        .unwrap();

        let captures = re
            .captures(s)
            .ok_or("string not in form #RGB, #RRGGBB or #RRGGBBAA")?;
        let channel = |i: usize| {
            captures
                .get(i)
                .map(|m| u8::from_str_radix(m.as_str(), 16).unwrap())
        };
        if let (Some(r), Some(g), Some(b)) = (channel(1), channel(2), channel(3)) {
            let a = channel(4).map(|x| x as f64 / 255.0);
            Ok(Color {
                r: r as f64 / 255.0,
                g: g as f64 / 255.0,
                b: b as f64 / 255.0,
                a,
            })
        } else {
            let short = |i: usize| {
                let x = channel(i).unwrap() as f64;
                (x * 16.0 + x) / 255.0
            };
            Ok(Color {
                r: short(5),
                g: short(6),
                b: short(7),
                a: None,
            })
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { r, g, b, a } = *self;
        let r = (r.clamp(0.0, 1.0) * 255.0) as u8;
        let g = (g.clamp(0.0, 1.0) * 255.0) as u8;
        let b = (b.clamp(0.0, 1.0) * 255.0) as u8;
        if let Some(a) = a {
            let a = (a.clamp(0.0, 1.0) * 255.0) as u8;
            write!(f, "#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        } else {
            write!(f, "#{:02X}{:02X}{:02X}", r, g, b)
        }
    }
}

struct ColorVisitor;

impl<'de> Visitor<'de> for ColorVisitor {
    type Value = Color;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string in the form #RGB, #RRGGBB or #RRGGBBAA")
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        v.parse::<Color>().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Color, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(ColorVisitor)
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
