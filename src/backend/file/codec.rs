//! Line encoding for the flat-file store.
//!
//! One record per line: `id,'title','country',year,runtime`. Single quotes
//! inside the title are doubled. A missing runtime is written as `NULL`.

use std::io::{self, Write};

use crate::core::{BenchError, Record};

const QUOTE: char = '\'';
const NULL_RUNTIME: &str = "NULL";
const FIELD_COUNT: usize = 5;

pub fn encode_line(record: &Record) -> io::Result<String> {
    let mut line = Vec::with_capacity(record.title.len() + 32);
    write_line(&mut line, record)?;
    Ok(String::from_utf8_lossy(&line).into_owned())
}

/// One record per line: a title or country holding a line break cannot be
/// written without splitting the record.
pub fn is_encodable(record: &Record) -> bool {
    let breaks = |s: &str| s.contains(['\n', '\r']);
    !breaks(&record.title) && !breaks(&record.country)
}

/// Write the encoded record without a trailing newline. Nothing is written
/// when the record is not [`is_encodable`].
pub fn write_line<W: Write>(out: &mut W, record: &Record) -> io::Result<()> {
    if !is_encodable(record) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("record {} contains a line break", record.id),
        ));
    }
    write!(out, "{},'", record.id)?;
    for (i, part) in record.title.split(QUOTE).enumerate() {
        if i > 0 {
            out.write_all(b"''")?;
        }
        out.write_all(part.as_bytes())?;
    }
    write!(out, "','{}',{},", record.country, record.year)?;
    match record.runtime {
        Some(runtime) => write!(out, "{runtime}"),
        None => out.write_all(NULL_RUNTIME.as_bytes()),
    }
}

pub fn decode_line(line: &str) -> Result<Record, BenchError> {
    let mut fields = [""; FIELD_COUNT];
    let mut count = 0;
    for field in split_fields(line) {
        if count == FIELD_COUNT {
            return Err(decode_error(line, "too many fields"));
        }
        fields[count] = field.trim();
        count += 1;
    }
    if count != FIELD_COUNT {
        return Err(decode_error(line, "too few fields"));
    }

    let id = fields[0]
        .parse::<u32>()
        .map_err(|e| decode_error(line, &format!("id: {e}")))?;
    let title = unquote(fields[1]).replace("''", "'");
    let country = unquote(fields[2]).to_string();
    let year = fields[3]
        .parse::<i32>()
        .map_err(|e| decode_error(line, &format!("year: {e}")))?;
    let runtime = match fields[4] {
        NULL_RUNTIME => None,
        value => Some(
            value
                .parse::<u32>()
                .map_err(|e| decode_error(line, &format!("runtime: {e}")))?,
        ),
    };

    Ok(Record {
        id,
        title,
        country,
        year,
        runtime,
    })
}

/// Split on commas that are outside single-quoted sections. A doubled quote
/// toggles the state twice, so it never ends a quoted section.
fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    let mut quoted = false;
    let mut start = 0;
    let mut done = false;
    let mut chars = line.char_indices();
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        for (i, c) in chars.by_ref() {
            match c {
                QUOTE => quoted = !quoted,
                ',' if !quoted => {
                    let field = &line[start..i];
                    start = i + 1;
                    return Some(field);
                }
                _ => {}
            }
        }
        done = true;
        Some(&line[start..])
    })
}

/// Strip at most one leading and one trailing quote.
fn unquote(field: &str) -> &str {
    let field = field.strip_prefix(QUOTE).unwrap_or(field);
    field.strip_suffix(QUOTE).unwrap_or(field)
}

fn decode_error(line: &str, reason: &str) -> BenchError {
    BenchError::DecodeError(format!("{reason} in {line:?}"))
}
