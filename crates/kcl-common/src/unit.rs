//! Unit suffixes on numeric literals: classification, compatibility, and
//! conversion. Only three categories exist, so this stays a closed match
//! rather than a trait-based conversion graph.

use std::fmt;

use serde::Serialize;

/// A unit suffix recognised on a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Unit {
    Mm,
    Cm,
    M,
    In,
    /// The `inch` spelling of [`Unit::In`]. Same category and conversion
    /// factor, kept as a distinct variant only so the formatter can print
    /// back the spelling the author wrote instead of silently canonicalising it.
    Inch,
    Ft,
    Yd,
    Deg,
    Rad,
    Count,
}

impl Unit {
    /// Parse a unit suffix, case-sensitively. `_` denotes the dimensionless
    /// `Count` unit; `?` is accepted as an alias for it.
    pub fn from_str(s: &str) -> Option<Unit> {
        match s {
            "mm" => Some(Unit::Mm),
            "cm" => Some(Unit::Cm),
            "m" => Some(Unit::M),
            "in" => Some(Unit::In),
            "inch" => Some(Unit::Inch),
            "ft" => Some(Unit::Ft),
            "yd" => Some(Unit::Yd),
            "deg" => Some(Unit::Deg),
            "rad" => Some(Unit::Rad),
            "_" | "?" => Some(Unit::Count),
            _ => None,
        }
    }

    pub fn category(self) -> UnitCategory {
        match self {
            Unit::Mm | Unit::Cm | Unit::M | Unit::In | Unit::Inch | Unit::Ft | Unit::Yd => UnitCategory::Length,
            Unit::Deg | Unit::Rad => UnitCategory::Angle,
            Unit::Count => UnitCategory::Count,
        }
    }

    /// Value of one unit expressed in millimetres (the Length base unit).
    fn mm_per_unit(self) -> f64 {
        match self {
            Unit::Mm => 1.0,
            Unit::Cm => 10.0,
            Unit::M => 1000.0,
            Unit::In | Unit::Inch => 25.4,
            Unit::Ft => 304.8,
            Unit::Yd => 914.4,
            Unit::Deg | Unit::Rad | Unit::Count => 1.0,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::M => "m",
            Unit::In => "in",
            Unit::Inch => "inch",
            Unit::Ft => "ft",
            Unit::Yd => "yd",
            Unit::Deg => "deg",
            Unit::Rad => "rad",
            Unit::Count => "_",
        };
        write!(f, "{s}")
    }
}

/// The partition of the unit set used for compatibility checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCategory {
    Length,
    Angle,
    Count,
}

/// Whether two units may be compared or added directly.
pub fn compatible(a: Unit, b: Unit) -> bool {
    a.category() == b.category()
}

/// Error returned when [`convert`] is asked to cross categories.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitConversionError {
    pub from: Unit,
    pub to: Unit,
}

impl fmt::Display for UnitConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cannot convert between incompatible units '{}' and '{}'",
            self.from, self.to
        )
    }
}

/// Convert `value` from unit `from` to unit `to`. Angle units convert via
/// degrees/radians; Length units convert via millimetres; Count is the
/// identity unit and only converts to itself.
pub fn convert(value: f64, from: Unit, to: Unit) -> Result<f64, UnitConversionError> {
    if !compatible(from, to) {
        return Err(UnitConversionError { from, to });
    }
    let result = match from.category() {
        UnitCategory::Length => value * from.mm_per_unit() / to.mm_per_unit(),
        UnitCategory::Angle => match (from, to) {
            (Unit::Deg, Unit::Rad) => value.to_radians(),
            (Unit::Rad, Unit::Deg) => value.to_degrees(),
            _ => value,
        },
        UnitCategory::Count => value,
    };
    Ok(result)
}
