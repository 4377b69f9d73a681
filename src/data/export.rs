use std::io::Write;
use std::path::Path;

use crate::data::signals::SignalStore;
use crate::error::Result;

/// Write every signal of `store` as `signal,time,value` rows, in
/// registration order. Snapshots are exported when present.
pub fn write_csv<W: Write>(mut out: W, store: &SignalStore) -> Result<()> {
    writeln!(out, "signal,time,value")?;
    for signal in store.iter() {
        let series = signal.view();
        for i in 0..series.len() {
            writeln!(out, "{},{:.9},{}", signal.name, series.time_at(i), series.value_at(i))?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn save_csv<P: AsRef<Path>>(path: P, store: &SignalStore) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::time_series::SampleBuffer;

    #[test]
    fn rows_follow_registration_order() {
        let mut store = SignalStore::new();
        store.insert("b", SampleBuffer::from_columns(&[0.0], &[1.5]).unwrap());
        store.insert("a", SampleBuffer::from_columns(&[0.0, 0.5], &[2.0, -1.0]).unwrap());
        let mut buf = Vec::new();
        write_csv(&mut buf, &store).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "signal,time,value");
        assert_eq!(lines[1], "b,0.000000000,1.5");
        assert_eq!(lines[3], "a,0.500000000,-1");
        assert_eq!(lines.len(), 4);
    }
}
