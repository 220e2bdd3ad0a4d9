use std::fmt;
use std::io::{self, Write};

use super::record::{SymbolTriplet, TripletRecord};
use crate::alphabet::symbol_char;

/// Score in C `%.8e` notation: signed exponent of at least two digits.
struct Scientific(f64);

impl fmt::Display for Scientific {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            return f.write_str("nan");
        }
        if value.is_infinite() {
            return f.write_str(if value > 0.0 { "inf" } else { "-inf" });
        }
        let rendered = format!("{value:.8e}");
        match rendered.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                write!(f, "{mantissa}e{sign}{digits:0>2}")
            }
            None => f.write_str(&rendered),
        }
    }
}

/// Write a ranked triplet list: a `# <count>` header, then one line per
/// record with its tab-separated packed fields and score.
pub fn write_triplets<W: Write, R: TripletRecord>(mut writer: W, records: &[R]) -> io::Result<()> {
    writeln!(writer, "# {}", records.len())?;
    let mut fields = Vec::with_capacity(R::FIELDS);
    for record in records {
        fields.clear();
        record.extend_fields(&mut fields);
        for field in &fields {
            write!(writer, "{field}\t")?;
        }
        writeln!(writer, "{}", Scientific(record.score()))?;
    }
    writer.flush()
}

/// Write symbol triplets as a TSV table with amino-acid letters.
///
/// When `counts` is given it must be parallel to `records` and is appended as
/// a trailing `counts` column.
pub fn write_triplet_table<W: Write>(
    mut writer: W,
    records: &[SymbolTriplet],
    counts: Option<&[f64]>,
) -> io::Result<()> {
    if let Some(counts) = counts {
        if counts.len() != records.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{} counts supplied for {} triplets",
                    counts.len(),
                    records.len()
                ),
            ));
        }
    }

    write!(writer, "t\ti\tj\tk\ta\tb\tc\tscore")?;
    if counts.is_some() {
        write!(writer, "\tcounts")?;
    }
    writeln!(writer)?;

    for (t, record) in records.iter().enumerate() {
        write!(
            writer,
            "{t}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            record.i,
            record.j,
            record.k,
            symbol_char(record.a),
            symbol_char(record.b),
            symbol_char(record.c),
            Scientific(record.score)
        )?;
        if let Some(counts) = counts {
            write!(writer, "\t{}", counts[t])?;
        }
        writeln!(writer)?;
    }
    writer.flush()
}
