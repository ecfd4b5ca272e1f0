//! JSON-lines sample logs for record and replay.
//!
//! One record per line, strictly increasing sequence numbers. A recorded
//! session replayed through a fresh detector reproduces the same outputs,
//! which is the main debugging tool for field captures.

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Read, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay log I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed record at line {line}: {source}")]
    Malformed {
        line: usize,
        source: serde_json::Error,
    },
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("records out of order at seq {seq}")]
    OutOfOrder { seq: u64 },
}

/// One tick of recorded input. `value` is `None` while no body was tracked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub seq: u64,
    pub dt: f32,
    pub value: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lean: Option<f32>,
}

pub fn read_records<R: Read>(reader: R) -> Result<Vec<SampleRecord>, ReplayError> {
    let mut records = Vec::new();
    let mut last_seq = None;
    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: SampleRecord =
            serde_json::from_str(&line).map_err(|source| ReplayError::Malformed {
                line: idx + 1,
                source,
            })?;
        if let Some(prev) = last_seq {
            if record.seq <= prev {
                return Err(ReplayError::OutOfOrder { seq: record.seq });
            }
        }
        last_seq = Some(record.seq);
        records.push(record);
    }
    Ok(records)
}

pub fn write_records<W: Write>(
    writer: &mut W,
    records: &[SampleRecord],
) -> Result<(), ReplayError> {
    for record in records {
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_log() -> Vec<SampleRecord> {
        vec![
            SampleRecord { seq: 0, dt: 0.1, value: Some(0.5), lean: None },
            SampleRecord { seq: 1, dt: 0.1, value: None, lean: None },
            SampleRecord { seq: 2, dt: 0.1, value: Some(0.48), lean: Some(0.2) },
        ]
    }

    #[test]
    fn round_trips_through_bytes() {
        let records = sample_log();
        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();
        let back = read_records(buf.as_slice()).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn round_trips_through_a_file() {
        let records = sample_log();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write_records(&mut file, &records).unwrap();
        let back = read_records(std::fs::File::open(file.path()).unwrap()).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn skips_blank_lines() {
        let text = "{\"seq\":0,\"dt\":0.1,\"value\":0.5}\n\n{\"seq\":1,\"dt\":0.1,\"value\":null}\n";
        let records = read_records(text.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].value, None);
    }

    #[test]
    fn reports_malformed_line_number() {
        let text = "{\"seq\":0,\"dt\":0.1,\"value\":0.5}\nnot json\n";
        match read_records(text.as_bytes()) {
            Err(ReplayError::Malformed { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_order_sequence() {
        let text = "{\"seq\":5,\"dt\":0.1,\"value\":0.5}\n{\"seq\":5,\"dt\":0.1,\"value\":0.5}\n";
        assert!(matches!(
            read_records(text.as_bytes()),
            Err(ReplayError::OutOfOrder { seq: 5 })
        ));
    }
}
