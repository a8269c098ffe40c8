//! Rendering of a [`Problem`] in the .lp file format read by external solvers
//!
use std::fmt;
use std::fmt::Formatter;
use std::io::prelude::*;
use std::io::Result;

use tempfile::NamedTempFile;

use crate::model::ObjectiveSense;
use crate::problem::{Column, Problem, Row};

/// Implemented by structures that can be dumped in the .lp format
pub trait WriteToLpFileFormat {
    /// Write the object to the given formatter in the .lp format
    fn to_lp_file_format(&self, f: &mut fmt::Formatter) -> fmt::Result;
}

impl<'a, T: WriteToLpFileFormat> WriteToLpFileFormat for &'a T {
    fn to_lp_file_format(&self, f: &mut Formatter) -> fmt::Result {
        (*self).to_lp_file_format(f)
    }
}

/// A linear sum of columns, e.g. `3 x + y - 2 z`
pub struct LinearSum<'a> {
    terms: &'a [(usize, f64)],
    columns: &'a [Column],
}

impl<'a> LinearSum<'a> {
    /// Terms refer to `columns` by position
    pub fn new(terms: &'a [(usize, f64)], columns: &'a [Column]) -> Self {
        LinearSum { terms, columns }
    }
}

impl WriteToLpFileFormat for LinearSum<'_> {
    fn to_lp_file_format(&self, f: &mut Formatter) -> fmt::Result {
        if self.terms.is_empty() {
            // the format needs at least one term
            return match self.columns.first() {
                Some(column) => write!(f, "0 {}", column.name),
                None => write!(f, "0"),
            };
        }
        for (position, (column, coeff)) in self.terms.iter().enumerate() {
            let name = &self.columns[*column].name;
            let sign = if *coeff < 0.0 { "-" } else { "+" };
            let magnitude = coeff.abs();
            match (position, sign) {
                (0, "+") => {}
                (0, _) => write!(f, "- ")?,
                _ => write!(f, " {} ", sign)?,
            }
            if magnitude == 1.0 {
                write!(f, "{}", name)?;
            } else {
                write!(f, "{} {}", magnitude, name)?;
            }
        }
        Ok(())
    }
}

/// A row with its columns, e.g. `cap: 2 x + y <= 10`
struct RowLine<'a> {
    row: &'a Row,
    columns: &'a [Column],
}

impl WriteToLpFileFormat for RowLine<'_> {
    fn to_lp_file_format(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: ", self.row.name)?;
        LinearSum::new(&self.row.terms, self.columns).to_lp_file_format(f)?;
        write!(f, " {} {}", self.row.relation.symbol(), self.row.rhs)
    }
}

impl WriteToLpFileFormat for Problem {
    fn to_lp_file_format(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "\\ {}\n\n", self.name)?;
        objective_lp_file_block(self, f)?;
        write_constraints_lp_file_block(self, f)?;
        write_bounds_lp_file_block(self, f)?;
        write!(f, "\nEnd\n")?;
        Ok(())
    }
}

impl Problem {
    /// Return an object whose [fmt::Display] implementation is the problem in the .lp format
    pub fn display_lp(&self) -> DisplayedLp<'_> {
        DisplayedLp(self)
    }

    /// Write the problem to a temporary file, deleted when the handle is dropped
    pub fn to_tmp_file(&self) -> Result<NamedTempFile> {
        let prefix: String = self
            .name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        let mut f = tempfile::Builder::new()
            .prefix(&format!("{}_", prefix))
            .suffix(".lp")
            .tempfile()?;
        write!(f, "{}", self.display_lp())?;
        f.flush()?;
        Ok(f)
    }
}

/// A problem whose `Display` implementation outputs valid .lp syntax
pub struct DisplayedLp<'a>(&'a Problem);

impl std::fmt::Display for DisplayedLp<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.to_lp_file_format(f)
    }
}

fn objective_lp_file_block(prob: &Problem, f: &mut Formatter) -> fmt::Result {
    let obj_type = match prob.sense {
        ObjectiveSense::Maximize => "Maximize\n  ",
        ObjectiveSense::Minimize => "Minimize\n  ",
    };
    write!(f, "{}obj: ", obj_type)?;
    LinearSum::new(&prob.objective, &prob.columns).to_lp_file_format(f)?;
    writeln!(f)
}

fn write_constraints_lp_file_block(prob: &Problem, f: &mut Formatter) -> fmt::Result {
    if !prob.rows.is_empty() {
        write!(f, "\nSubject To\n")?;
    }
    for row in &prob.rows {
        write!(f, "  ")?;
        RowLine {
            row,
            columns: &prob.columns,
        }
        .to_lp_file_format(f)?;
        writeln!(f)?;
    }
    Ok(())
}

fn write_bounds_lp_file_block(prob: &Problem, f: &mut Formatter) -> fmt::Result {
    let mut integers = vec![];
    write!(f, "\nBounds\n")?;
    for column in &prob.columns {
        let low: f64 = column.lower_bound;
        let up: f64 = column.upper_bound;
        write!(f, "  ")?;
        if low == up {
            writeln!(f, "{} = {}", column.name, low)?;
        } else if low.is_infinite() && up.is_infinite() {
            writeln!(f, "{} free", column.name)?;
        } else {
            if low > f64::NEG_INFINITY {
                write!(f, "{} <= ", low)?;
            } else {
                // the format's default lower bound is 0
                write!(f, "-inf <= ")?;
            }
            write!(f, "{}", column.name)?;
            if up < f64::INFINITY {
                write!(f, " <= {}", up)?;
            }
            writeln!(f)?;
        }
        if column.is_integer() {
            integers.push(column.name.as_str());
        }
    }
    if !integers.is_empty() {
        writeln!(f, "\nGenerals")?;
        for name in integers.iter() {
            writeln!(f, "  {}", name)?;
        }
    }
    Ok(())
}
