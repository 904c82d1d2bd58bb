use super::traits::{AtomRecord, LoadRange, TrajectoryChunk, TrajectoryFile};
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PdbError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: PdbParseErrorKind },
}

#[derive(Debug, Error)]
pub enum PdbParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 54 chars)")]
    LineTooShort,
    #[error("Model has {found} atoms, first model has {expected}")]
    InconsistentAtomCount { expected: usize, found: usize },
    #[error("CONECT record references unknown atom serial {serial}")]
    UnknownConectSerial { serial: usize },
}

/// PDB files, read as one frame per `MODEL`/`ENDMDL` block (or a single
/// frame when the file carries no `MODEL` records).
pub struct PdbFile;

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_float(line: &str, start: usize, end: usize, line_no: usize) -> Result<f64, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_no,
        kind: PdbParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.to_string(),
        },
    })
}

fn parse_int<T: std::str::FromStr>(
    line: &str,
    start: usize,
    end: usize,
    line_no: usize,
) -> Result<T, PdbError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| PdbError::Parse {
        line: line_no,
        kind: PdbParseErrorKind::InvalidInt {
            columns: format!("{}-{}", start + 1, end),
            value: value.to_string(),
        },
    })
}

fn element_of(line: &str, name: &str) -> String {
    let element = slice_and_trim(line, 76, 78);
    if !element.is_empty() {
        return element.to_string();
    }
    name.chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_string())
        .unwrap_or_default()
}

/// Accumulates one model while scanning the file.
#[derive(Default)]
struct ModelScan {
    atoms_seen: usize,
    positions: Vec<Point3<f64>>,
}

struct PdbScanner<'r> {
    range: &'r LoadRange,
    chunk: TrajectoryChunk,
    serials: HashMap<usize, usize>,
    conect: Vec<(usize, usize, usize)>,
    model: ModelScan,
    frame_index: usize,
}

impl<'r> PdbScanner<'r> {
    fn new(range: &'r LoadRange) -> Self {
        Self {
            range,
            chunk: TrajectoryChunk::default(),
            serials: HashMap::new(),
            conect: Vec::new(),
            model: ModelScan::default(),
            frame_index: 0,
        }
    }

    fn first_model(&self) -> bool {
        self.frame_index == 0
    }

    fn keeps_current(&self) -> bool {
        self.range.selects(self.frame_index)
    }

    fn done(&self) -> bool {
        self.frame_index > 0 && self.range.is_past(self.frame_index)
    }

    fn atom_line(&mut self, line: &str, line_no: usize) -> Result<(), PdbError> {
        if line.len() < 54 {
            return Err(PdbError::Parse {
                line: line_no,
                kind: PdbParseErrorKind::LineTooShort,
            });
        }
        let keep = self.keeps_current();

        if self.first_model() {
            let name = slice_and_trim(line, 12, 16).to_string();
            let serial_str = slice_and_trim(line, 6, 11);
            if let Ok(serial) = serial_str.parse::<usize>() {
                self.serials.insert(serial, self.chunk.atoms.len());
            }
            let resid_str = slice_and_trim(line, 22, 26);
            let resid = if resid_str.is_empty() {
                0
            } else {
                parse_int(line, 22, 26, line_no)?
            };
            self.chunk.atoms.push(AtomRecord {
                element: element_of(line, &name),
                resname: slice_and_trim(line, 17, 20).to_string(),
                resid,
                name,
            });
        }

        if keep {
            self.model.positions.push(Point3::new(
                parse_float(line, 30, 38, line_no)?,
                parse_float(line, 38, 46, line_no)?,
                parse_float(line, 46, 54, line_no)?,
            ));
        }
        self.model.atoms_seen += 1;
        Ok(())
    }

    fn conect_line(&mut self, line: &str, line_no: usize) -> Result<(), PdbError> {
        let mut fields = line[6.min(line.len())..].split_whitespace();
        let Some(first) = fields.next() else {
            return Ok(());
        };
        let origin: usize = first.parse().map_err(|_| PdbError::Parse {
            line: line_no,
            kind: PdbParseErrorKind::InvalidInt {
                columns: "7-11".to_string(),
                value: first.to_string(),
            },
        })?;
        for field in fields {
            let target: usize = field.parse().map_err(|_| PdbError::Parse {
                line: line_no,
                kind: PdbParseErrorKind::InvalidInt {
                    columns: "12-31".to_string(),
                    value: field.to_string(),
                },
            })?;
            self.conect.push((origin, target, line_no));
        }
        Ok(())
    }

    fn end_model(&mut self, line_no: usize) -> Result<(), PdbError> {
        if self.model.atoms_seen == 0 {
            return Ok(());
        }
        let model = std::mem::take(&mut self.model);
        if model.atoms_seen != self.chunk.atoms.len() {
            return Err(PdbError::Parse {
                line: line_no,
                kind: PdbParseErrorKind::InconsistentAtomCount {
                    expected: self.chunk.atoms.len(),
                    found: model.atoms_seen,
                },
            });
        }
        if self.keeps_current() {
            self.chunk.frames.push(model.positions);
        }
        self.frame_index += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<TrajectoryChunk, PdbError> {
        let mut bonds = Vec::new();
        for (origin, target, line_no) in self.conect {
            let lookup = |serial: usize| {
                self.serials
                    .get(&serial)
                    .copied()
                    .ok_or_else(|| PdbError::Parse {
                        line: line_no,
                        kind: PdbParseErrorKind::UnknownConectSerial { serial },
                    })
            };
            let (a, b) = (lookup(origin)?, lookup(target)?);
            let bond = (a.min(b), a.max(b));
            if a != b && !bonds.contains(&bond) {
                bonds.push(bond);
            }
        }
        self.chunk.bonds = bonds;
        Ok(self.chunk)
    }
}

impl TrajectoryFile for PdbFile {
    type Error = PdbError;

    fn read_frames(
        reader: &mut impl BufRead,
        range: &LoadRange,
    ) -> Result<TrajectoryChunk, Self::Error> {
        let mut scanner = PdbScanner::new(range);
        let mut line_no = 0;

        for line_result in reader.lines() {
            let line = line_result?;
            line_no += 1;

            // Past the range only CONECT records matter; they trail the last model.
            let done = scanner.done();
            match line.get(0..6).unwrap_or(line.as_str()).trim_end() {
                "ATOM" | "HETATM" if !done => scanner.atom_line(&line, line_no)?,
                "CONECT" => scanner.conect_line(&line, line_no)?,
                "ENDMDL" | "END" if !done => scanner.end_model(line_no)?,
                _ => {}
            }
        }
        scanner.end_model(line_no)?;

        scanner.finish()
    }
}
