use super::traits::{AtomRecord, LoadRange, TrajectoryChunk, TrajectoryFile};
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse { line: usize, kind: XyzParseErrorKind },
}

#[derive(Debug, Error)]
pub enum XyzParseErrorKind {
    #[error("Invalid atom count '{value}'")]
    InvalidAtomCount { value: String },
    #[error("Invalid coordinate '{value}'")]
    InvalidFloat { value: String },
    #[error("Atom line needs an element and three coordinates")]
    ShortAtomLine,
    #[error("Frame ended after {found} of {expected} atoms")]
    TruncatedFrame { expected: usize, found: usize },
    #[error("Frame has {found} atoms, first frame has {expected}")]
    InconsistentAtomCount { expected: usize, found: usize },
}

/// Multi-frame XYZ files: an atom count line, a comment line, then one
/// `element x y z` line per atom, repeated for every frame.
pub struct XyzFile;

struct LineSource<'a, R: BufRead> {
    reader: &'a mut R,
    line_no: usize,
    buf: String,
}

impl<'a, R: BufRead> LineSource<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }

    fn next_line(&mut self) -> io::Result<Option<&str>> {
        self.buf.clear();
        if self.reader.read_line(&mut self.buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        Ok(Some(self.buf.trim_end()))
    }
}

fn parse_coord(value: &str, line: usize) -> Result<f64, XyzError> {
    value.parse().map_err(|_| XyzError::Parse {
        line,
        kind: XyzParseErrorKind::InvalidFloat {
            value: value.to_string(),
        },
    })
}

impl TrajectoryFile for XyzFile {
    type Error = XyzError;

    fn read_frames(
        reader: &mut impl BufRead,
        range: &LoadRange,
    ) -> Result<TrajectoryChunk, Self::Error> {
        let mut lines = LineSource::new(reader);
        let mut chunk = TrajectoryChunk::default();
        let mut frame_index = 0usize;

        loop {
            if range.is_past(frame_index) && !chunk.atoms.is_empty() {
                break;
            }

            let count_line = loop {
                match lines.next_line()? {
                    None => return Ok(chunk),
                    Some(line) if line.trim().is_empty() => continue,
                    Some(line) => break line.trim().to_string(),
                }
            };
            let count_line_no = lines.line_no;
            let num_atoms: usize = count_line.parse().map_err(|_| XyzError::Parse {
                line: count_line_no,
                kind: XyzParseErrorKind::InvalidAtomCount {
                    value: count_line.clone(),
                },
            })?;

            let first_frame = chunk.atoms.is_empty();
            if !first_frame && num_atoms != chunk.atoms.len() {
                return Err(XyzError::Parse {
                    line: count_line_no,
                    kind: XyzParseErrorKind::InconsistentAtomCount {
                        expected: chunk.atoms.len(),
                        found: num_atoms,
                    },
                });
            }

            // Comment line.
            if lines.next_line()?.is_none() {
                return Err(XyzError::Parse {
                    line: lines.line_no,
                    kind: XyzParseErrorKind::TruncatedFrame {
                        expected: num_atoms,
                        found: 0,
                    },
                });
            }

            let keep = range.selects(frame_index);
            let mut positions = Vec::with_capacity(if keep { num_atoms } else { 0 });

            for found in 0..num_atoms {
                let line_no = lines.line_no + 1;
                let Some(line) = lines.next_line()? else {
                    return Err(XyzError::Parse {
                        line: line_no,
                        kind: XyzParseErrorKind::TruncatedFrame {
                            expected: num_atoms,
                            found,
                        },
                    });
                };
                if !keep && !first_frame {
                    continue;
                }

                let fields: Vec<&str> = line.split_whitespace().collect();
                if fields.len() < 4 {
                    return Err(XyzError::Parse {
                        line: line_no,
                        kind: XyzParseErrorKind::ShortAtomLine,
                    });
                }
                if first_frame {
                    chunk.atoms.push(AtomRecord {
                        name: fields[0].to_string(),
                        resname: String::new(),
                        resid: 0,
                        element: fields[0].to_string(),
                    });
                }
                if keep {
                    positions.push(Point3::new(
                        parse_coord(fields[1], line_no)?,
                        parse_coord(fields[2], line_no)?,
                        parse_coord(fields[3], line_no)?,
                    ));
                }
            }

            if keep {
                chunk.frames.push(positions);
            }
            frame_index += 1;
        }

        Ok(chunk)
    }
}
