use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FluidError;

/// Fluid presets. Each maps to a fixed `(diffusion_rate, viscosity)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FluidType {
    #[default]
    Water,
    Oil,
    Honey,
    Air,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FluidProperties {
    pub diffusion_rate: f64,
    pub viscosity: f64,
}

impl FluidType {
    pub const ALL: [FluidType; 4] = [FluidType::Water, FluidType::Oil, FluidType::Honey, FluidType::Air];

    pub fn properties(self) -> FluidProperties {
        let (diffusion_rate, viscosity) = match self {
            FluidType::Water => (0.0001, 0.0001),
            FluidType::Oil => (0.00005, 0.0005),
            FluidType::Honey => (0.00001, 0.001),
            FluidType::Air => (0.0002, 0.000015),
        };
        FluidProperties { diffusion_rate, viscosity }
    }

    pub fn name(self) -> &'static str {
        match self {
            FluidType::Water => "water",
            FluidType::Oil => "oil",
            FluidType::Honey => "honey",
            FluidType::Air => "air",
        }
    }
}

impl FromStr for FluidType {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "water" => Ok(FluidType::Water),
            "oil" => Ok(FluidType::Oil),
            "honey" => Ok(FluidType::Honey),
            "air" => Ok(FluidType::Air),
            _ => Err(FluidError::UnknownFluidType(s.to_string())),
        }
    }
}

/// Edge-condition policy for the four outer rings of every field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Environment {
    /// Reflective walls: no flow through the outer edges.
    #[default]
    Bounded,
    /// Toroidal wrap-around on both axes.
    Periodic,
}

impl Environment {
    pub fn name(self) -> &'static str {
        match self {
            Environment::Bounded => "bounded",
            Environment::Periodic => "periodic",
        }
    }
}

impl FromStr for Environment {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bounded" => Ok(Environment::Bounded),
            "periodic" => Ok(Environment::Periodic),
            _ => Err(FluidError::UnknownEnvironment(s.to_string())),
        }
    }
}

/// Grid edge that accepts injected fluid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Edge {
    Top,
    Left,
}

impl Edge {
    pub fn name(self) -> &'static str {
        match self {
            Edge::Top => "top",
            Edge::Left => "left",
        }
    }
}

impl FromStr for Edge {
    type Err = FluidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Edge::Top),
            "left" => Ok(Edge::Left),
            _ => Err(FluidError::UnknownEdge(s.to_string())),
        }
    }
}

macro_rules! string_conversions {
    ($($ty:ty),*) => {$(
        impl TryFrom<String> for $ty {
            type Error = FluidError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> String {
                value.name().to_string()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    )*};
}

string_conversions!(FluidType, Environment, Edge);
