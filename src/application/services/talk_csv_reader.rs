use csv::{ErrorKind, ReaderBuilder, StringRecord, Trim};
use tokio::sync::mpsc;

use crate::application::ports::StagedReader;
use crate::domain::{TalkCsvRecord, TalkRecordError, TalkRequest};

/// Counters gathered while reading one staged file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    pub rows_read: u64,
    pub rows_skipped: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum CsvReadError {
    #[error("unreadable csv: {0}")]
    Unreadable(#[from] csv::Error),
    #[error("batch consumer stopped")]
    ConsumerGone,
}

/// Why a single row was dropped.
#[derive(Debug, thiserror::Error)]
enum RowError {
    #[error("malformed row: {0}")]
    Malformed(csv::Error),
    #[error(transparent)]
    Invalid(#[from] TalkRecordError),
}

/// Streams `reader` row by row, sending full batches of valid talks in file order.
///
/// Blocking: call from `spawn_blocking`. Only recognized row-level failures
/// (bad encoding, shape, or field values) skip a row; I/O failures end the read.
pub fn read_talk_batches(
    reader: StagedReader,
    batch_size: usize,
    batches: mpsc::Sender<Vec<TalkRequest>>,
) -> Result<ReadStats, CsvReadError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: StringRecord = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    csv_reader.set_headers(headers.clone());

    let mut stats = ReadStats::default();
    let mut batch = Vec::with_capacity(batch_size);
    let mut record = StringRecord::new();

    loop {
        let row = match csv_reader.read_record(&mut record) {
            Ok(false) => break,
            Ok(true) => parse_row(&record, &headers),
            Err(e) if is_row_level(&e) => Err(RowError::Malformed(e)),
            Err(e) => return Err(CsvReadError::Unreadable(e)),
        };
        stats.rows_read += 1;

        match row {
            Ok(talk) => batch.push(talk),
            Err(reason) => {
                stats.rows_skipped += 1;
                let line = row_line(&record, &reason);
                tracing::warn!(
                    line,
                    link = record_link(&record, &headers),
                    reason = %reason,
                    "Invalid record skipped"
                );
                continue;
            }
        }

        if batch.len() == batch_size {
            let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
            batches
                .blocking_send(full)
                .map_err(|_| CsvReadError::ConsumerGone)?;
        }
    }

    if !batch.is_empty() {
        batches
            .blocking_send(batch)
            .map_err(|_| CsvReadError::ConsumerGone)?;
    }

    Ok(stats)
}

fn parse_row(record: &StringRecord, headers: &StringRecord) -> Result<TalkRequest, RowError> {
    let raw: TalkCsvRecord = record
        .deserialize(Some(headers))
        .map_err(RowError::Malformed)?;
    Ok(TalkRequest::try_from(raw)?)
}

/// A row rejected inside `read_record` leaves `record` cleared, so its line
/// comes from the parser error.
fn row_line(record: &StringRecord, reason: &RowError) -> u64 {
    let from_error = match reason {
        RowError::Malformed(e) => e.position(),
        RowError::Invalid(_) => None,
    };
    from_error
        .or_else(|| record.position())
        .map(|p| p.line())
        .unwrap_or_default()
}

fn is_row_level(error: &csv::Error) -> bool {
    matches!(
        error.kind(),
        ErrorKind::Utf8 { .. } | ErrorKind::UnequalLengths { .. } | ErrorKind::Deserialize { .. }
    )
}

fn record_link<'r>(record: &'r StringRecord, headers: &StringRecord) -> &'r str {
    headers
        .iter()
        .position(|h| h == "link")
        .and_then(|idx| record.get(idx))
        .unwrap_or("<unknown>")
}
