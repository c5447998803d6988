//! Inclusive code-point intervals, and intervals with sub-intervals punched
//! out of them.

use std::fmt;

/// An inclusive interval of code points. The NUL code point is never a valid
/// lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimpleRange {
    lo: u32,
    hi: u32,
}

impl SimpleRange {
    /// Returns `None` unless `lo <= hi` and `lo > 0`.
    ///
    /// ```
    /// # use libmkf::range::SimpleRange;
    /// assert!(SimpleRange::new('a' as u32, 'z' as u32).is_some());
    /// assert!(SimpleRange::new(5, 3).is_none());
    /// assert!(SimpleRange::new(0, 10).is_none());
    /// ```
    pub fn new(lo: u32, hi: u32) -> Option<Self> {
        if Self::valid(lo, hi) {
            Some(Self { lo, hi })
        } else {
            None
        }
    }

    pub fn valid(lo: u32, hi: u32) -> bool {
        lo <= hi && lo > 0
    }

    pub fn lo(&self) -> u32 {
        self.lo
    }

    pub fn hi(&self) -> u32 {
        self.hi
    }

    pub fn contains(&self, ch: char) -> bool {
        let ch = ch as u32;
        self.lo <= ch && ch <= self.hi
    }
}

/// A base range minus an ordered list of excluded ranges. Exclusions are
/// checked one by one; they are never merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexRange {
    base: SimpleRange,
    excludes: Vec<SimpleRange>,
}

impl ComplexRange {
    pub fn new(base: SimpleRange, excludes: Vec<SimpleRange>) -> Self {
        Self { base, excludes }
    }

    pub fn base(&self) -> &SimpleRange {
        &self.base
    }

    pub fn excludes(&self) -> &[SimpleRange] {
        &self.excludes
    }

    pub fn contains(&self, ch: char) -> bool {
        self.base.contains(ch) && !self.excludes.iter().any(|ex| ex.contains(ch))
    }
}

/// Writes a code point the way the grammar notation spells it: printable
/// characters quoted as-is, everything else as uppercase hex.
pub(crate) fn write_code_point(f: &mut fmt::Formatter<'_>, cp: u32) -> fmt::Result {
    match char::from_u32(cp) {
        Some(ch) if cp > 0x20 && !ch.is_control() && ch != '\'' && cp < 0x80 => {
            write!(f, "'{}'", ch)
        }
        _ if cp > 0xFFFFF => write!(f, "'{:06X}'", cp),
        _ => write!(f, "'{:04X}'", cp),
    }
}

impl fmt::Display for SimpleRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_code_point(f, self.lo)?;
        f.write_str(" . ")?;
        write_code_point(f, self.hi)
    }
}

impl fmt::Display for ComplexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for ex in &self.excludes {
            f.write_str(" - ")?;
            if ex.lo == ex.hi {
                write_code_point(f, ex.lo)?;
            } else {
                write!(f, "{}", ex)?;
            }
        }
        Ok(())
    }
}
